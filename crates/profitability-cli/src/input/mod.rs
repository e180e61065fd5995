pub mod file;
pub mod sheet;
pub mod stdin;

use profitability_core::records::{Dataset, RawTable};

/// Load the dataset from `--input`, or from stdin: a JSON `RawTable` or CSV text.
pub fn load_dataset(path: Option<&str>) -> Result<Dataset, Box<dyn std::error::Error>> {
    let table: RawTable = if let Some(path) = path {
        sheet::load_table(path)?
    } else if let Some(data) = stdin::read_stdin()? {
        parse_piped(&data)?
    } else {
        return Err("--input <file.csv|file.xlsx|file.json> or stdin required".into());
    };
    Ok(Dataset::from_table(&table)?)
}

fn parse_piped(data: &str) -> Result<RawTable, Box<dyn std::error::Error>> {
    let trimmed = data.trim_start();
    if trimmed.starts_with('{') {
        Ok(serde_json::from_str(trimmed)?)
    } else {
        sheet::parse_csv(trimmed.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piped_json_table() {
        let t = parse_piped(r#" {"headers": ["Mes"], "rows": [["Jan"]]}"#).unwrap();
        assert_eq!(t.headers, vec!["Mes"]);
    }

    #[test]
    fn test_piped_csv() {
        let t = parse_piped("Mes,Ano\nJan,2024\n").unwrap();
        assert_eq!(t.headers, vec!["Mes", "Ano"]);
        assert_eq!(t.rows, vec![vec!["Jan".to_string(), "2024".to_string()]]);
    }
}
