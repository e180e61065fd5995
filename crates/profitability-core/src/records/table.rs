use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DataFormatError;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const COL_MONTH: &str = "Mes";
pub const COL_YEAR: &str = "Ano";
pub const COL_CLIENT: &str = "Nome Cliente";
pub const COL_PROJECT: &str = "Nome Projecto";
pub const COL_REVENUE: &str = "Total Proveitos";
pub const COL_COST: &str = "Total Custos";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_MONTH,
    COL_YEAR,
    COL_CLIENT,
    COL_PROJECT,
    COL_REVENUE,
    COL_COST,
];

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

/// A parsed sheet before any validation: a header row plus string cells.
///
/// Whatever reads the file (CSV, XLSX, JSON) produces one of these; every
/// cell is kept as text so that coercion rules live in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }
}

/// Positions of the required columns inside a `RawTable` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnIndex {
    pub month: usize,
    pub year: usize,
    pub client: usize,
    pub project: usize,
    pub revenue: usize,
    pub cost: usize,
}

impl ColumnIndex {
    /// Locate every required column. Header names are compared after trimming.
    pub fn resolve(headers: &[String]) -> Result<Self, DataFormatError> {
        if headers.is_empty() {
            return Err(DataFormatError::EmptyTable);
        }
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DataFormatError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            month: find(COL_MONTH)?,
            year: find(COL_YEAR)?,
            client: find(COL_CLIENT)?,
            project: find(COL_PROJECT)?,
            revenue: find(COL_REVENUE)?,
            cost: find(COL_COST)?,
        })
    }
}

/// Cell text at `idx`, trimmed. Short rows read as empty cells.
pub(crate) fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// Lenient numeric coercion for amount cells.
///
/// Accepts plain and scientific notation. Anything else (blank, text,
/// locale-formatted numbers) becomes `None` and the caller substitutes zero.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    Decimal::from_str(t)
        .or_else(|_| Decimal::from_scientific(t))
        .ok()
}

/// Year cells arrive as "2024" from CSV and sometimes "2024.0" from sheets.
pub(crate) fn parse_year(text: &str) -> Option<i32> {
    let t = text.trim();
    if let Ok(y) = t.parse::<i32>() {
        return Some(y);
    }
    let d = parse_amount(t)?;
    if d.fract().is_zero() {
        d.to_i32()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_trims_header_whitespace() {
        let h = headers(&[
            " Mes",
            "Ano ",
            "Nome Cliente",
            " Nome Projecto ",
            "Total Proveitos",
            "Total Custos",
        ]);
        let idx = ColumnIndex::resolve(&h).unwrap();
        assert_eq!(idx.month, 0);
        assert_eq!(idx.project, 3);
        assert_eq!(idx.cost, 5);
    }

    #[test]
    fn test_resolve_reports_missing_column() {
        let h = headers(&["Mes", "Ano", "Nome Cliente", "Nome Projecto", "Total Proveitos"]);
        assert_eq!(
            ColumnIndex::resolve(&h),
            Err(DataFormatError::MissingColumn("Total Custos".into()))
        );
    }

    #[test]
    fn test_resolve_empty_headers() {
        assert_eq!(ColumnIndex::resolve(&[]), Err(DataFormatError::EmptyTable));
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("1234.50"), Some(dec!(1234.50)));
        assert_eq!(parse_amount(" -12 "), Some(dec!(-12)));
        assert_eq!(parse_amount("1.5e3"), Some(dec!(1500)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("1.234,56"), None);
    }

    #[test]
    fn test_parse_year_variants() {
        assert_eq!(parse_year("2024"), Some(2024));
        assert_eq!(parse_year("2024.0"), Some(2024));
        assert_eq!(parse_year("2024.5"), None);
        assert_eq!(parse_year("next year"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let row = vec!["Jan".to_string()];
        assert_eq!(cell(&row, 0), "Jan");
        assert_eq!(cell(&row, 4), "");
    }
}
