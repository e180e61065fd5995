//! Daily management-time allocation.
//!
//! Covers:
//! 1. **Eligibility** -- revenue > 0, optionally margin >= threshold
//! 2. **Weighting** -- weight = max(profitability %, 0) * margin
//! 3. **Proportional hours** -- weight / total weight * budget
//! 4. **Half-hour rounding** with a single conservation correction
//! 5. **What-if profitability** -- allocated hours billed at the daily rate
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregation::AggregateRow;
use crate::allocation::rounding::{conserve_total, is_half_multiple, round_to_half};
use crate::error::ProfitabilityError;
use crate::profitability::checked_profitability_pct;
use crate::records::ProjectRecord;
use crate::types::{Hours, Money, Pct};
use crate::ProfitabilityResult;

/// Hours in the standard working day used to convert the daily rate to an hourly one.
pub const WORKDAY_HOURS: Decimal = dec!(8);

pub const DEFAULT_BUDGET_HOURS: Decimal = dec!(8);
pub const DEFAULT_COST_PER_DAY: Decimal = dec!(262);

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Allocation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Hours distributed per day. Must be a positive multiple of 0.5.
    pub total_budget_hours: Hours,
    /// Standard daily cost of management time.
    pub cost_per_day: Money,
    /// Projects with a margin below this are not eligible. `None` admits
    /// every project with positive revenue.
    pub min_margin_threshold: Option<Money>,
    /// Report margin / cost_per_day as "days supported".
    pub include_days_supported: bool,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            total_budget_hours: DEFAULT_BUDGET_HOURS,
            cost_per_day: DEFAULT_COST_PER_DAY,
            min_margin_threshold: Some(DEFAULT_COST_PER_DAY),
            include_days_supported: true,
        }
    }
}

impl AllocationConfig {
    pub fn validate(&self) -> ProfitabilityResult<()> {
        if self.total_budget_hours <= Decimal::ZERO || !is_half_multiple(self.total_budget_hours) {
            return Err(ProfitabilityError::InvalidInput {
                field: "total_budget_hours".into(),
                reason: "Budget must be a positive multiple of 0.5 hours".into(),
            });
        }
        if self.cost_per_day <= Decimal::ZERO {
            return Err(ProfitabilityError::InvalidInput {
                field: "cost_per_day".into(),
                reason: "Daily cost must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn cost_per_hour(&self) -> Money {
        self.cost_per_day / WORKDAY_HOURS
    }
}

/// A project competing for the period's time budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationCandidate {
    pub client: String,
    pub project: String,
    pub revenue: Money,
    pub cost: Money,
}

impl From<&ProjectRecord> for AllocationCandidate {
    fn from(r: &ProjectRecord) -> Self {
        Self {
            client: r.client.clone(),
            project: r.project.clone(),
            revenue: r.revenue,
            cost: r.cost,
        }
    }
}

impl From<&AggregateRow> for AllocationCandidate {
    fn from(a: &AggregateRow) -> Self {
        Self {
            client: a.client.clone(),
            project: a.project.clone(),
            revenue: a.revenue_sum,
            cost: a.cost_sum,
        }
    }
}

/// One project's share of the budget and the resulting what-if figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub client: String,
    pub project: String,
    pub revenue: Money,
    pub cost: Money,
    pub margin: Money,
    pub profitability_pct: Pct,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_supported: Option<Decimal>,
    pub weight: Decimal,
    pub hours_precise: Hours,
    pub hours_rounded: Hours,
    /// hours_rounded * cost_per_day / 8
    pub simulated_cost: Money,
    /// cost + simulated_cost
    pub new_total_cost: Money,
    pub adjusted_profitability_pct: Pct,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Margin, profitability and weight of one candidate, overflow-checked.
struct Figures {
    margin: Money,
    profitability_pct: Pct,
    weight: Decimal,
}

impl Figures {
    fn of(candidate: &AllocationCandidate) -> ProfitabilityResult<Self> {
        let margin = candidate.revenue.checked_sub(candidate.cost);
        let profitability_pct = checked_profitability_pct(candidate.revenue, candidate.cost);
        match (margin, profitability_pct) {
            (Some(margin), Some(profitability_pct)) => {
                let weight = allocation_weight(profitability_pct, margin)
                    .ok_or_else(|| out_of_range(candidate))?;
                Ok(Self {
                    margin,
                    profitability_pct,
                    weight,
                })
            }
            _ => Err(out_of_range(candidate)),
        }
    }
}

fn out_of_range(candidate: &AllocationCandidate) -> ProfitabilityError {
    ProfitabilityError::InvalidInput {
        field: "candidates".into(),
        reason: format!(
            "Amounts for {} / {} exceed the decimal range",
            candidate.client, candidate.project
        ),
    }
}

fn overflow(field: &str) -> ProfitabilityError {
    ProfitabilityError::InvalidInput {
        field: field.into(),
        reason: "Value exceeds the decimal range".into(),
    }
}

/// Negative profitability contributes no weight. `None` on overflow.
pub fn allocation_weight(profitability: Pct, margin: Money) -> Option<Decimal> {
    profitability.max(Decimal::ZERO).checked_mul(margin)
}

/// margin / cost_per_day, rounded to one decimal and floored at zero.
/// `None` on overflow.
pub fn days_supported(margin: Money, cost_per_day: Money) -> Option<Decimal> {
    margin.checked_div(cost_per_day).map(|days| {
        days.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
            .max(Decimal::ZERO)
    })
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Distribute `config.total_budget_hours` across the eligible candidates.
///
/// Only eligible candidates appear in the output, in input order. When the
/// total weight is positive the rounded hours sum exactly to the budget and
/// no row goes negative; otherwise every row gets zero hours. Errors on
/// invalid configuration or amounts whose products leave the Decimal range.
pub fn allocate_hours(
    candidates: &[AllocationCandidate],
    config: &AllocationConfig,
) -> ProfitabilityResult<Vec<AllocationRow>> {
    config.validate()?;

    let mut eligible: Vec<(&AllocationCandidate, Figures)> = Vec::new();
    for c in candidates.iter().filter(|c| c.revenue > Decimal::ZERO) {
        let figures = Figures::of(c)?;
        if config
            .min_margin_threshold
            .map_or(true, |min| figures.margin >= min)
        {
            eligible.push((c, figures));
        }
    }

    let total_weight = eligible
        .iter()
        .try_fold(Decimal::ZERO, |acc, (_, f)| acc.checked_add(f.weight))
        .ok_or_else(|| overflow("total_weight"))?;

    let (precise, rounded) = if total_weight > Decimal::ZERO {
        let precise = eligible
            .iter()
            .map(|(_, f)| {
                (f.weight / total_weight).checked_mul(config.total_budget_hours)
            })
            .collect::<Option<Vec<Hours>>>()
            .ok_or_else(|| overflow("hours_precise"))?;
        let mut rounded: Vec<Hours> = precise.iter().copied().map(round_to_half).collect();
        if let Some(idx) = conserve_total(&precise, &mut rounded, config.total_budget_hours) {
            debug!(row = idx, "rounding drift absorbed");
        }
        (precise, rounded)
    } else {
        (vec![Decimal::ZERO; eligible.len()], vec![Decimal::ZERO; eligible.len()])
    };

    debug!(
        candidates = candidates.len(),
        eligible = eligible.len(),
        total_weight = %total_weight,
        "allocated management hours"
    );

    let cost_per_hour = config.cost_per_hour();
    let mut rows = Vec::with_capacity(eligible.len());
    for ((c, f), (hours_precise, hours_rounded)) in
        eligible.into_iter().zip(precise.into_iter().zip(rounded))
    {
        let simulated_cost = hours_rounded
            .checked_mul(cost_per_hour)
            .ok_or_else(|| overflow("simulated_cost"))?;
        let new_total_cost = c
            .cost
            .checked_add(simulated_cost)
            .ok_or_else(|| out_of_range(c))?;
        let adjusted_profitability_pct = checked_profitability_pct(c.revenue, new_total_cost)
            .ok_or_else(|| out_of_range(c))?;
        let days_supported = if config.include_days_supported {
            Some(days_supported(f.margin, config.cost_per_day).ok_or_else(|| overflow("cost_per_day"))?)
        } else {
            None
        };

        rows.push(AllocationRow {
            client: c.client.clone(),
            project: c.project.clone(),
            revenue: c.revenue,
            cost: c.cost,
            margin: f.margin,
            profitability_pct: f.profitability_pct,
            days_supported,
            weight: f.weight,
            hours_precise,
            hours_rounded,
            simulated_cost,
            new_total_cost,
            adjusted_profitability_pct,
        });
    }

    Ok(rows)
}
