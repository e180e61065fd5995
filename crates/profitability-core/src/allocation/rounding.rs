//! Half-hour rounding with total conservation.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::Hours;

/// Drift below this is treated as zero.
pub const CONSERVATION_TOLERANCE: Decimal = dec!(0.000000001);

const HALF_HOUR: Decimal = dec!(0.5);

/// Round to the nearest 0.5, ties to the even half-step (2.25 → 2.0, 2.75 → 3.0).
pub fn round_to_half(hours: Hours) -> Hours {
    (hours / HALF_HOUR).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven) * HALF_HOUR
}

/// True when `hours` is a whole number of half-hours.
pub fn is_half_multiple(hours: Hours) -> bool {
    (hours * dec!(2)).fract().is_zero()
}

/// Push the rounding drift onto a single row so `rounded` sums to `total`.
///
/// The row chosen is the one whose rounding moved it furthest against the
/// direction of the correction: when the rounded sum is short, the row that
/// was rounded down the most; when it is over, the row rounded up the most.
/// Only rows that stay non-negative after the adjustment qualify. Ties go to
/// the earliest row. Returns the index that absorbed the drift, or `None` if
/// no correction was needed.
///
/// When no single row can absorb an excess without going negative, the drift
/// is taken off in half-hour steps, each from the best qualifying row.
pub fn conserve_total(precise: &[Hours], rounded: &mut [Hours], total: Hours) -> Option<usize> {
    debug_assert_eq!(precise.len(), rounded.len());

    let delta = total - rounded.iter().copied().sum::<Decimal>();
    if delta.abs() <= CONSERVATION_TOLERANCE {
        return None;
    }

    if let Some(idx) = absorbing_row(precise, rounded, delta) {
        rounded[idx] = round_to_half(rounded[idx] + delta);
        return Some(idx);
    }

    let step = if delta.is_sign_negative() { -HALF_HOUR } else { HALF_HOUR };
    let mut remaining = delta;
    let mut first = None;
    while remaining.abs() >= HALF_HOUR {
        let Some(idx) = absorbing_row(precise, rounded, step) else {
            break;
        };
        rounded[idx] += step;
        remaining -= step;
        first.get_or_insert(idx);
    }
    first
}

/// Index of the largest residual (precise - rounded) with the same sign as
/// `delta`, among rows that stay non-negative once `delta` is applied. Falls
/// back to the largest absolute residual among those rows.
fn absorbing_row(precise: &[Hours], rounded: &[Hours], delta: Decimal) -> Option<usize> {
    let residuals: Vec<Decimal> = precise
        .iter()
        .zip(rounded)
        .map(|(p, r)| p - r)
        .collect();

    let argmax = |keep: &dyn Fn(usize, Decimal) -> bool| -> Option<usize> {
        let mut best: Option<(usize, Decimal)> = None;
        for (i, r) in residuals.iter().enumerate() {
            if rounded[i] + delta < Decimal::ZERO || !keep(i, *r) {
                continue;
            }
            let magnitude = r.abs();
            // strictly greater keeps the first of equal residuals
            if best.map_or(true, |(_, b)| magnitude > b) {
                best = Some((i, magnitude));
            }
        }
        best.map(|(i, _)| i)
    };

    argmax(&|_, r| !r.is_zero() && r.is_sign_positive() == delta.is_sign_positive())
        .or_else(|| argmax(&|_, _| true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_half_nearest() {
        assert_eq!(round_to_half(dec!(6.6667)), dec!(6.5));
        assert_eq!(round_to_half(dec!(1.3333)), dec!(1.5));
        assert_eq!(round_to_half(dec!(0.1)), dec!(0));
        assert_eq!(round_to_half(dec!(0.26)), dec!(0.5));
    }

    #[test]
    fn test_round_to_half_ties_to_even_step() {
        // 2.25 * 2 = 4.5 -> 4 ; 2.75 * 2 = 5.5 -> 6
        assert_eq!(round_to_half(dec!(2.25)), dec!(2.0));
        assert_eq!(round_to_half(dec!(2.75)), dec!(3.0));
        assert_eq!(round_to_half(dec!(0.25)), dec!(0));
        assert_eq!(round_to_half(dec!(0.75)), dec!(1.0));
    }

    #[test]
    fn test_is_half_multiple() {
        assert!(is_half_multiple(dec!(3.5)));
        assert!(is_half_multiple(dec!(0)));
        assert!(!is_half_multiple(dec!(1.25)));
    }

    #[test]
    fn test_no_correction_when_sum_matches() {
        let precise = [dec!(6.6667), dec!(1.3333)];
        let mut rounded = [dec!(6.5), dec!(1.5)];
        assert_eq!(conserve_total(&precise, &mut rounded, dec!(8)), None);
        assert_eq!(rounded, [dec!(6.5), dec!(1.5)]);
    }

    #[test]
    fn test_shortfall_goes_to_row_rounded_down_most() {
        // precise 8/3 each, rounded 2.5 each -> short by 0.5
        let third = dec!(8) / dec!(3);
        let precise = [third, third, third];
        let mut rounded = [dec!(2.5), dec!(2.5), dec!(2.5)];
        assert_eq!(conserve_total(&precise, &mut rounded, dec!(8)), Some(0));
        assert_eq!(rounded, [dec!(3.0), dec!(2.5), dec!(2.5)]);
    }

    #[test]
    fn test_excess_goes_to_row_rounded_up_most() {
        let precise = [dec!(2.8), dec!(2.8), dec!(2.4)];
        let mut rounded = [dec!(3.0), dec!(3.0), dec!(2.5)];
        assert_eq!(conserve_total(&precise, &mut rounded, dec!(8)), Some(0));
        assert_eq!(rounded, [dec!(2.5), dec!(3.0), dec!(2.5)]);
    }

    #[test]
    fn test_excess_never_taken_from_row_rounded_down() {
        // Row 0 has an equally large residual but was rounded *down* to zero.
        let precise = [dec!(0.25), dec!(0.75), dec!(1.75), dec!(2.75), dec!(2.5)];
        let mut rounded = [dec!(0), dec!(1), dec!(2), dec!(3), dec!(2.5)];
        assert_eq!(conserve_total(&precise, &mut rounded, dec!(8)), Some(1));
        assert_eq!(rounded[0], dec!(0));
        assert_eq!(rounded[1], dec!(0.5));
        assert_eq!(rounded.iter().copied().sum::<Decimal>(), dec!(8));
    }

    #[test]
    fn test_excess_skips_rows_that_would_go_negative() {
        // 0.26 x5 rounds up to 0.5 each, 6.7 down to 6.5: 9.0h, one hour over
        let mut precise = vec![dec!(0.26); 5];
        precise.push(dec!(6.7));
        let mut rounded = vec![dec!(0.5); 5];
        rounded.push(dec!(6.5));
        assert_eq!(conserve_total(&precise, &mut rounded, dec!(8)), Some(5));
        assert_eq!(rounded[5], dec!(5.5));
        assert!(rounded.iter().all(|h| *h >= Decimal::ZERO));
        assert_eq!(rounded.iter().copied().sum::<Decimal>(), dec!(8));
    }

    #[test]
    fn test_excess_spread_when_no_single_row_can_absorb() {
        let precise = [dec!(0.3); 4];
        let mut rounded = [dec!(0.5); 4];
        assert_eq!(conserve_total(&precise, &mut rounded, dec!(1)), Some(0));
        assert_eq!(rounded, [dec!(0), dec!(0), dec!(0.5), dec!(0.5)]);
    }

    #[test]
    fn test_empty_rows_no_correction_target() {
        let mut rounded: [Decimal; 0] = [];
        assert_eq!(conserve_total(&[], &mut rounded, dec!(8)), None);
    }
}
