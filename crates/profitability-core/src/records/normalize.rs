use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DataFormatError;
use crate::month::Month;
use crate::profitability;
use crate::records::table::{cell, parse_amount, parse_year, ColumnIndex, RawTable};
use crate::types::{Money, Pct};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One validated row: a project's revenue and cost for one month.
///
/// Margin and profitability are derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub year: i32,
    pub month: Month,
    pub client: String,
    pub project: String,
    pub revenue: Money,
    pub cost: Money,
}

impl ProjectRecord {
    pub fn margin(&self) -> Money {
        profitability::margin(self.revenue, self.cost)
    }

    pub fn profitability_pct(&self) -> Pct {
        profitability::profitability_pct(self.revenue, self.cost)
    }
}

/// Immutable, cheaply cloneable handle over a normalized dataset.
///
/// Every engine call takes the dataset by reference; nothing in the crate
/// caches derived views between calls.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[ProjectRecord]>,
}

impl Dataset {
    pub fn new(records: Vec<ProjectRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Normalize a raw table into a dataset.
    pub fn from_table(table: &RawTable) -> Result<Self, DataFormatError> {
        normalize(table).map(Self::new)
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Validate and coerce a raw table into `ProjectRecord`s.
///
/// - A missing required column or an unrecognised month fails the batch.
/// - Rows with an empty month cell are dropped.
/// - Rows with an empty year cell are dropped; a non-integer year fails.
/// - Non-numeric or blank amounts become zero, as do amounts beyond
///   [`MAX_AMOUNT`]. Amounts are rounded to the cent.
///
/// Row numbers in errors are 1-based and do not count the header.
pub fn normalize(table: &RawTable) -> Result<Vec<ProjectRecord>, DataFormatError> {
    let cols = ColumnIndex::resolve(&table.headers)?;
    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped = 0usize;

    for (i, row) in table.rows.iter().enumerate() {
        let row_no = i + 1;

        let month_text = cell(row, cols.month);
        if month_text.is_empty() {
            dropped += 1;
            continue;
        }
        let month: Month = month_text
            .parse()
            .map_err(|_| DataFormatError::UnknownMonth {
                row: row_no,
                value: month_text.to_string(),
            })?;

        let year_text = cell(row, cols.year);
        if year_text.is_empty() {
            warn!(row = row_no, "dropping row without a year");
            dropped += 1;
            continue;
        }
        let year = parse_year(year_text).ok_or_else(|| DataFormatError::InvalidYear {
            row: row_no,
            value: year_text.to_string(),
        })?;

        let revenue = coerce_amount(cell(row, cols.revenue), row_no, "revenue");
        let cost = coerce_amount(cell(row, cols.cost), row_no, "cost");

        records.push(ProjectRecord {
            year,
            month,
            client: cell(row, cols.client).to_string(),
            project: cell(row, cols.project).to_string(),
            revenue,
            cost,
        });
    }

    debug!(
        rows = table.rows.len(),
        kept = records.len(),
        dropped,
        "normalized input table"
    );
    Ok(records)
}

/// Largest amount magnitude accepted from a sheet cell. Anything beyond is
/// treated like a non-numeric cell so sums and ratios stay inside the
/// Decimal range.
pub const MAX_AMOUNT: Money = dec!(1000000000000);

/// Amounts are euro values kept to the cent.
const AMOUNT_DP: u32 = 2;

fn coerce_amount(text: &str, row: usize, field: &str) -> Money {
    match parse_amount(text) {
        Some(v) if v.abs() > MAX_AMOUNT => {
            warn!(row, field, value = %v, "amount out of range coerced to 0");
            Decimal::ZERO
        }
        Some(v) => {
            let v = v.round_dp_with_strategy(AMOUNT_DP, RoundingStrategy::MidpointAwayFromZero);
            if v.is_sign_negative() && !v.is_zero() {
                warn!(row, field, value = %v, "negative amount kept as-is");
            }
            v
        }
        None => {
            if !text.is_empty() {
                debug!(row, field, text, "non-numeric amount coerced to 0");
            }
            Decimal::ZERO
        }
    }
}
