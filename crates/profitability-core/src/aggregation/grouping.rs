use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregation::filter::{filter_records, Selection};
use crate::month::Month;
use crate::profitability::profitability_pct;
use crate::records::ProjectRecord;
use crate::types::{Money, Pct};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A single filtered record with its derived figures materialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRow {
    pub year: i32,
    pub month: Month,
    pub client: String,
    pub project: String,
    pub revenue: Money,
    pub cost: Money,
    pub margin: Money,
    pub profitability_pct: Pct,
}

impl From<&ProjectRecord> for DetailRow {
    fn from(r: &ProjectRecord) -> Self {
        Self {
            year: r.year,
            month: r.month,
            client: r.client.clone(),
            project: r.project.clone(),
            revenue: r.revenue,
            cost: r.cost,
            margin: r.margin(),
            profitability_pct: r.profitability_pct(),
        }
    }
}

/// Records sharing (client, project), summed.
///
/// `profitability_pct` is derived from the sums, never averaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub client: String,
    pub project: String,
    pub revenue_sum: Money,
    pub cost_sum: Money,
    pub margin_sum: Money,
    pub profitability_pct: Pct,
    /// Number of records folded into this row.
    pub record_count: usize,
}

/// One row of the profitability table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultRow {
    Detail(DetailRow),
    Aggregate(AggregateRow),
}

impl ResultRow {
    pub fn project(&self) -> &str {
        match self {
            ResultRow::Detail(d) => &d.project,
            ResultRow::Aggregate(a) => &a.project,
        }
    }

    pub fn profitability_pct(&self) -> Pct {
        match self {
            ResultRow::Detail(d) => d.profitability_pct,
            ResultRow::Aggregate(a) => a.profitability_pct,
        }
    }
}

/// Headline figures over a set of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub revenue: Money,
    pub cost: Money,
    pub margin: Money,
    pub profitability_pct: Pct,
    pub record_count: usize,
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

/// Sum revenue and cost over `records`. Empty input gives all-zero totals.
pub fn summarize<'a, I>(records: I) -> Totals
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut revenue = Decimal::ZERO;
    let mut cost = Decimal::ZERO;
    let mut record_count = 0usize;
    for r in records {
        revenue += r.revenue;
        cost += r.cost;
        record_count += 1;
    }
    Totals {
        revenue,
        cost,
        margin: revenue - cost,
        profitability_pct: profitability_pct(revenue, cost),
        record_count,
    }
}

/// Group by (client, project), ordered by client then project.
pub fn aggregate_by_project<'a, I>(records: I) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut groups: BTreeMap<(&str, &str), (Money, Money, Money, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups
            .entry((r.client.as_str(), r.project.as_str()))
            .or_insert((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, 0));
        entry.0 += r.revenue;
        entry.1 += r.cost;
        entry.2 += r.margin();
        entry.3 += 1;
    }

    groups
        .into_iter()
        .map(
            |((client, project), (revenue_sum, cost_sum, margin_sum, record_count))| AggregateRow {
                client: client.to_string(),
                project: project.to_string(),
                revenue_sum,
                cost_sum,
                margin_sum,
                profitability_pct: profitability_pct(revenue_sum, cost_sum),
                record_count,
            },
        )
        .collect()
}

/// Detail rows sorted by month ascending, then profitability descending.
/// Equal keys keep input order.
pub fn detail_rows<'a, I>(records: I) -> Vec<DetailRow>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut rows: Vec<DetailRow> = records.into_iter().map(DetailRow::from).collect();
    rows.sort_by(|a, b| {
        a.month
            .cmp(&b.month)
            .then_with(|| b.profitability_pct.cmp(&a.profitability_pct))
    });
    rows
}

/// Filter `records` by `selection`, then either collapse months into
/// per-(client, project) aggregates or list sorted detail rows.
pub fn filter_and_aggregate(
    records: &[ProjectRecord],
    selection: &Selection,
    collapse_months: bool,
) -> Vec<ResultRow> {
    let filtered = filter_records(records, selection);
    debug!(
        total = records.len(),
        matched = filtered.len(),
        collapse_months,
        "filtered records"
    );

    if collapse_months {
        aggregate_by_project(filtered)
            .into_iter()
            .map(ResultRow::Aggregate)
            .collect()
    } else {
        detail_rows(filtered)
            .into_iter()
            .map(ResultRow::Detail)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rec(month: Month, client: &str, project: &str, revenue: Decimal, cost: Decimal) -> ProjectRecord {
        ProjectRecord {
            year: 2024,
            month,
            client: client.into(),
            project: project.into(),
            revenue,
            cost,
        }
    }

    #[test]
    fn test_aggregate_uses_sums_not_average() {
        let recs = vec![
            rec(Month::Jan, "ACME", "Portal", dec!(100), dec!(0)),
            rec(Month::Fev, "ACME", "Portal", dec!(100), dec!(200)),
        ];
        assert_eq!(recs[0].profitability_pct(), dec!(100));
        assert_eq!(recs[1].profitability_pct(), dec!(-100));

        let agg = aggregate_by_project(&recs);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].revenue_sum, dec!(200));
        assert_eq!(agg[0].cost_sum, dec!(200));
        assert_eq!(agg[0].margin_sum, Decimal::ZERO);
        assert_eq!(agg[0].profitability_pct, Decimal::ZERO);
        assert_eq!(agg[0].record_count, 2);
    }

    #[test]
    fn test_duplicates_are_summed() {
        let recs = vec![
            rec(Month::Mar, "ACME", "Portal", dec!(300), dec!(100)),
            rec(Month::Mar, "ACME", "Portal", dec!(300), dec!(100)),
        ];
        let agg = aggregate_by_project(&recs);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].revenue_sum, dec!(600));
        assert_eq!(agg[0].margin_sum, dec!(400));
    }

    #[test]
    fn test_aggregate_order_by_client_then_project() {
        let recs = vec![
            rec(Month::Jan, "Globex", "B", dec!(1), dec!(0)),
            rec(Month::Jan, "ACME", "Z", dec!(1), dec!(0)),
            rec(Month::Jan, "ACME", "A", dec!(1), dec!(0)),
        ];
        let keys: Vec<(String, String)> = aggregate_by_project(&recs)
            .into_iter()
            .map(|a| (a.client, a.project))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("ACME".to_string(), "A".to_string()),
                ("ACME".to_string(), "Z".to_string()),
                ("Globex".to_string(), "B".to_string()),
            ]
        );
    }

    #[test]
    fn test_detail_sorted_by_month_then_profitability_desc() {
        let recs = vec![
            rec(Month::Mar, "A", "p1", dec!(100), dec!(90)),
            rec(Month::Jan, "B", "p2", dec!(100), dec!(80)),
            rec(Month::Mar, "C", "p3", dec!(100), dec!(10)),
            rec(Month::Jan, "D", "p4", dec!(100), dec!(50)),
        ];
        let rows = detail_rows(&recs);
        let clients: Vec<&str> = rows.iter().map(|r| r.client.as_str()).collect();
        assert_eq!(clients, vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_summarize_empty_is_zero() {
        let none: Vec<ProjectRecord> = Vec::new();
        let t = summarize(&none);
        assert_eq!(t.revenue, Decimal::ZERO);
        assert_eq!(t.cost, Decimal::ZERO);
        assert_eq!(t.margin, Decimal::ZERO);
        assert_eq!(t.profitability_pct, Decimal::ZERO);
        assert_eq!(t.record_count, 0);
    }

    #[test]
    fn test_filter_and_aggregate_no_match_is_empty() {
        let recs = vec![rec(Month::Jan, "ACME", "Portal", dec!(1), dec!(0))];
        let sel = Selection::for_year(1999);
        assert!(filter_and_aggregate(&recs, &sel, true).is_empty());
        assert!(filter_and_aggregate(&recs, &sel, false).is_empty());
    }

    #[test]
    fn test_filter_and_aggregate_modes() {
        let recs = vec![
            rec(Month::Jan, "ACME", "Portal", dec!(100), dec!(40)),
            rec(Month::Fev, "ACME", "Portal", dec!(100), dec!(60)),
        ];
        let collapsed = filter_and_aggregate(&recs, &Selection::all(), true);
        assert_eq!(collapsed.len(), 1);
        assert!(matches!(collapsed[0], ResultRow::Aggregate(_)));
        assert_eq!(collapsed[0].profitability_pct(), dec!(50));

        let detail = filter_and_aggregate(&recs, &Selection::all(), false);
        assert_eq!(detail.len(), 2);
        assert!(matches!(detail[0], ResultRow::Detail(_)));
        assert_eq!(detail[0].profitability_pct(), dec!(60));
    }
}
