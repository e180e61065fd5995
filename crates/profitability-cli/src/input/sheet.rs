use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use profitability_core::records::RawTable;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::file::{extension, read_json, resolve_path};

/// Load a revenue/cost sheet from `.csv`, `.xlsx`/`.xls`/`.ods` or `.json`.
pub fn load_table(path: &str) -> Result<RawTable, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let table = match extension(&canonical).as_str() {
        "csv" => read_csv(&canonical)?,
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(&canonical)?,
        "json" => read_json(path)?,
        other => return Err(format!("Unsupported input format '.{other}'").into()),
    };
    debug!(
        path = %canonical.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded input sheet"
    );
    Ok(table)
}

/// CSV file with a header row.
pub fn read_csv(path: &Path) -> Result<RawTable, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;
    parse_csv(file)
}

/// CSV with a header row. Ragged rows are allowed; fully blank rows are skipped.
pub fn parse_csv<R: Read>(source: R) -> Result<RawTable, Box<dyn std::error::Error>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawTable::new(headers, rows))
}

/// First worksheet of a spreadsheet; the first row is the header.
pub fn read_workbook(path: &Path) -> Result<RawTable, Box<dyn std::error::Error>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| format!("Workbook '{}' has no worksheets", path.display()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Ok(RawTable::default()),
    };

    let rows = sheet_rows
        .map(|r| {
            r.iter()
                .map(|c| c.to_string().trim().to_string())
                .collect::<Vec<String>>()
        })
        .filter(|r| r.iter().any(|v| !v.is_empty()))
        .collect();

    Ok(RawTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_sheet_parses_and_skips_blank_rows() {
        let mut f = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(f, "Mes,Ano,Nome Cliente,Nome Projecto,Total Proveitos,Total Custos").unwrap();
        writeln!(f, "Jan,2024,ACME,Portal,1000,400").unwrap();
        writeln!(f, ",,,,,").unwrap();
        writeln!(f, " Fev ,2024,ACME,Portal,900").unwrap();
        let t = load_table(f.path().to_str().unwrap()).unwrap();
        assert_eq!(t.headers.len(), 6);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[1][0], "Fev");
        assert_eq!(t.rows[1].len(), 5);
    }

    #[test]
    fn test_csv_sheet_normalizes() {
        let mut f = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(f, " Mes , Ano ,Nome Cliente,Nome Projecto,Total Proveitos,Total Custos").unwrap();
        writeln!(f, "Mar,2024,ACME,Portal,1000,abc").unwrap();
        let t = load_table(f.path().to_str().unwrap()).unwrap();
        let recs = profitability_core::records::normalize(&t).unwrap();
        assert_eq!(recs.len(), 1);
        assert!(recs[0].cost.is_zero());
    }

    #[test]
    fn test_json_table() {
        let mut f = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            f,
            r#"{{"headers": ["Mes","Ano"], "rows": [["Jan","2024"]]}}"#
        )
        .unwrap();
        let t = load_table(f.path().to_str().unwrap()).unwrap();
        assert_eq!(t.headers, vec!["Mes", "Ano"]);
        assert_eq!(t.rows.len(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let f = Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(load_table(f.path().to_str().unwrap()).is_err());
    }
}
