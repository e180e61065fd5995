use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read a JSON or YAML file, chosen by extension.
pub fn read_config<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    match extension(&canonical).as_str() {
        "yaml" | "yml" => {
            let contents = fs::read_to_string(&canonical)
                .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
            let value: T = serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
            Ok(value)
        }
        _ => read_json(path),
    }
}

/// Lower-cased file extension, empty when there is none.
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Make `path` absolute against the working directory and check it names an existing file.
pub fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use profitability_core::allocation::AllocationConfig;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_read_yaml_config_with_defaults() {
        let mut f = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(f, "cost_per_day: \"300\"").unwrap();
        writeln!(f, "min_margin_threshold: null").unwrap();
        let cfg: AllocationConfig = read_config(f.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.cost_per_day, dec!(300));
        assert_eq!(cfg.min_margin_threshold, None);
        assert_eq!(cfg.total_budget_hours, dec!(8));
    }

    #[test]
    fn test_read_json_config() {
        let mut f = Builder::new().suffix(".json").tempfile().unwrap();
        write!(f, r#"{{"total_budget_hours": "6", "include_days_supported": false}}"#).unwrap();
        let cfg: AllocationConfig = read_config(f.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.total_budget_hours, dec!(6));
        assert!(!cfg.include_days_supported);
        assert_eq!(cfg.min_margin_threshold, Some(dec!(262)));
    }

    #[test]
    fn test_missing_file() {
        assert!(resolve_path("/definitely/not/here.csv").is_err());
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_path(dir.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_existing_file_resolves_absolute() {
        let f = Builder::new().suffix(".json").tempfile().unwrap();
        let p = resolve_path(f.path().to_str().unwrap()).unwrap();
        assert!(p.is_absolute());
        assert!(p.is_file());
    }
}
