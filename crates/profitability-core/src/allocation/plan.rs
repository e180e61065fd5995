use std::time::Instant;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregation::{aggregate_by_project, filter_records, Choice, Selection};
use crate::allocation::engine::{allocate_hours, AllocationCandidate, AllocationConfig, AllocationRow};
use crate::month::Month;
use crate::records::{Dataset, ProjectRecord};
use crate::types::{with_metadata, ComputationOutput, Hours};
use crate::ProfitabilityResult;

/// A single month of a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: Month,
}

impl Period {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    pub fn containing<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: Month::of(date),
        }
    }

    /// The period of today's date on the local clock.
    pub fn current() -> Self {
        Self::containing(&chrono::Local::now().date_naive())
    }

    pub fn selection(&self) -> Selection {
        Selection {
            year: Some(self.year),
            months: Choice::only([self.month]),
            ..Selection::default()
        }
    }
}

/// Result of planning one period's allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub period: Period,
    /// Distinct (client, project) pairs active in the period.
    pub candidate_count: usize,
    pub total_weight: Decimal,
    pub total_hours: Hours,
    pub rows: Vec<AllocationRow>,
}

/// One candidate per (client, project) active in `period`; duplicate rows are summed.
pub fn period_candidates(records: &[ProjectRecord], period: Period) -> Vec<AllocationCandidate> {
    let in_period = filter_records(records, &period.selection());
    aggregate_by_project(in_period)
        .iter()
        .map(AllocationCandidate::from)
        .collect()
}

/// Allocate the daily budget across the projects of `period`.
pub fn plan_allocation(
    dataset: &Dataset,
    period: Period,
    config: &AllocationConfig,
) -> ProfitabilityResult<ComputationOutput<AllocationPlan>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let candidates = period_candidates(dataset.records(), period);
    let rows = allocate_hours(&candidates, config)?;

    let total_weight: Decimal = rows.iter().map(|r| r.weight).sum();
    let total_hours: Hours = rows.iter().map(|r| r.hours_rounded).sum();

    if candidates.is_empty() {
        warnings.push(format!(
            "No records for {} {}",
            period.month, period.year
        ));
    } else if rows.is_empty() {
        warnings.push(format!(
            "None of the {} projects in {} {} meet the eligibility rule",
            candidates.len(),
            period.month,
            period.year
        ));
    } else if total_weight.is_zero() {
        warnings.push(
            "No eligible project has positive profitability; no hours allocated".to_string(),
        );
    }

    let plan = AllocationPlan {
        period,
        candidate_count: candidates.len(),
        total_weight,
        total_hours,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Profitability-weighted daily time allocation with half-hour rounding",
        &serde_json::json!({
            "period": format!("{} {}", period.month, period.year),
            "config": config,
        }),
        warnings,
        elapsed,
        plan,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn rec(year: i32, month: Month, project: &str, revenue: Decimal, cost: Decimal) -> ProjectRecord {
        ProjectRecord {
            year,
            month,
            client: "ACME".into(),
            project: project.into(),
            revenue,
            cost,
        }
    }

    #[test]
    fn test_period_of_date() {
        let d = NaiveDate::from_ymd_opt(2025, 10, 3).unwrap();
        assert_eq!(Period::containing(&d), Period::new(2025, Month::Out));
    }

    #[test]
    fn test_period_candidates_sum_duplicates_and_skip_other_periods() {
        let recs = vec![
            rec(2024, Month::Jun, "Portal", dec!(1000), dec!(200)),
            rec(2024, Month::Jun, "Portal", dec!(500), dec!(100)),
            rec(2023, Month::Jun, "Portal", dec!(9999), dec!(0)),
            rec(2024, Month::Jul, "ERP", dec!(10), dec!(0)),
        ];
        let c = period_candidates(&recs, Period::new(2024, Month::Jun));
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].revenue, dec!(1500));
        assert_eq!(c[0].cost, dec!(300));
    }

    #[test]
    fn test_plan_warns_on_empty_period() {
        let ds = Dataset::new(vec![rec(2024, Month::Jan, "Portal", dec!(1000), dec!(0))]);
        let out = plan_allocation(&ds, Period::new(2024, Month::Fev), &AllocationConfig::default())
            .unwrap();
        assert!(out.result.rows.is_empty());
        assert_eq!(out.result.total_hours, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_plan_totals() {
        let ds = Dataset::new(vec![
            rec(2024, Month::Jan, "Portal", dec!(2000), dec!(1000)),
            rec(2024, Month::Jan, "ERP", dec!(2500), dec!(2000)),
        ]);
        let out = plan_allocation(&ds, Period::new(2024, Month::Jan), &AllocationConfig::default())
            .unwrap();
        assert_eq!(out.result.candidate_count, 2);
        assert_eq!(out.result.total_hours, dec!(8));
        assert!(out.warnings.is_empty());
    }
}
