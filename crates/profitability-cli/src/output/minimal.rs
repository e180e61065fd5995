use serde_json::Value;

use super::format::format_plain;

/// Headline numbers, most specific first. Dotted keys reach into nested objects.
const PRIORITY_KEYS: &[&str] = &["total_hours", "totals.profitability_pct"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_text(value));
}

fn minimal_text(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for key in PRIORITY_KEYS {
        if let Some(val) = lookup(result_obj, key) {
            if !val.is_null() {
                return format_plain(val);
            }
        }
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_plain(val));
        }
    }

    format_plain(result_obj)
}

fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted.split('.').try_fold(value, |v, part| v.get(part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_prints_total_hours() {
        let v = json!({"result": {"total_hours": "8", "rows": []}});
        assert_eq!(minimal_text(&v), "8");
    }

    #[test]
    fn test_report_prints_profitability() {
        let v = json!({"result": {"totals": {"profitability_pct": "36.5"}, "rows": []}});
        assert_eq!(minimal_text(&v), "36.5");
    }

    #[test]
    fn test_fallback_to_first_field() {
        let v = json!({"clients": ["ACME"]});
        assert_eq!(minimal_text(&v), "clients: ACME");
    }
}
