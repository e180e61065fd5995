use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregation::{
    filter_and_aggregate, filter_options, filter_records, summarize, FilterOptions, ResultRow,
    Selection, Totals,
};
use crate::records::Dataset;
use crate::types::{with_metadata, ComputationOutput};
use crate::ProfitabilityResult;

/// Headline totals plus the profitability table for a selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitabilityReport {
    pub selection: Selection,
    /// True when months were collapsed into per-project aggregates.
    pub collapsed: bool,
    pub totals: Totals,
    pub rows: Vec<ResultRow>,
}

/// Totals and table for `selection`.
///
/// Months are collapsed into (client, project) aggregates when the month
/// dimension is unconstrained; otherwise the table lists one row per record.
pub fn analyze_profitability(
    dataset: &Dataset,
    selection: &Selection,
) -> ProfitabilityResult<ComputationOutput<ProfitabilityReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let collapsed = selection.months.is_all();
    let totals = summarize(filter_records(dataset.records(), selection));
    let rows = filter_and_aggregate(dataset.records(), selection, collapsed);

    if dataset.is_empty() {
        warnings.push("Dataset contains no records".to_string());
    } else if rows.is_empty() {
        warnings.push("No records match the selected filters".to_string());
    }

    let loss_making = rows
        .iter()
        .filter(|r| r.profitability_pct() < Decimal::ZERO)
        .count();
    if loss_making > 0 {
        warnings.push(format!("{loss_making} row(s) with negative profitability"));
    }

    let report = ProfitabilityReport {
        selection: selection.clone(),
        collapsed,
        totals,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Project profitability: margin / revenue on summed totals",
        &serde_json::json!({
            "records": dataset.len(),
            "collapsed_months": collapsed,
        }),
        warnings,
        elapsed,
        report,
    ))
}

/// Filter widget values for `year` (or every year).
pub fn available_filters(dataset: &Dataset, year: Option<i32>) -> FilterOptions {
    filter_options(dataset.records(), year)
}
