use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Pct};

/// Margin of a revenue/cost pair.
pub fn margin(revenue: Money, cost: Money) -> Money {
    revenue - cost
}

/// Profitability as a percentage of revenue.
///
/// This is the single rule used for every profitability figure in the crate:
/// per record, per aggregate (on the summed totals) and after simulated
/// allocation cost.
///
/// - revenue > 0: `margin / revenue * 100`
/// - revenue <= 0 and cost > 0: `-100`
/// - otherwise: `0`
pub fn profitability_pct(revenue: Money, cost: Money) -> Pct {
    if revenue > Decimal::ZERO {
        margin(revenue, cost) / revenue * dec!(100)
    } else if cost > Decimal::ZERO {
        dec!(-100)
    } else {
        Decimal::ZERO
    }
}

/// [`profitability_pct`] with overflow checks; `None` when an intermediate
/// leaves the Decimal range.
pub fn checked_profitability_pct(revenue: Money, cost: Money) -> Option<Pct> {
    if revenue > Decimal::ZERO {
        revenue
            .checked_sub(cost)?
            .checked_div(revenue)?
            .checked_mul(dec!(100))
    } else if cost > Decimal::ZERO {
        Some(dec!(-100))
    } else {
        Some(Decimal::ZERO)
    }
}
