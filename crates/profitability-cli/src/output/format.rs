//! Display formatting for money, percentages and hours.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Fields rendered as euro amounts.
pub const MONEY_FIELDS: &[&str] = &[
    "revenue",
    "cost",
    "margin",
    "revenue_sum",
    "cost_sum",
    "margin_sum",
    "simulated_cost",
    "new_total_cost",
    "cost_per_day",
    "min_margin_threshold",
];

/// Fields rendered as percentages.
pub const PCT_FIELDS: &[&str] = &["profitability_pct", "adjusted_profitability_pct"];

/// Fields rendered as hours.
pub const HOURS_FIELDS: &[&str] = &["hours_precise", "hours_rounded", "total_hours", "total_budget_hours"];

/// `€ 1.234,56`: dot thousands separator, comma decimal separator.
pub fn format_eur(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("€ {sign}{grouped},{frac_part}")
}

pub fn format_pct(pct: Decimal) -> String {
    format!("{:.2}%", pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

pub fn format_hours(hours: Decimal) -> String {
    format!("{:.1}h", hours.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Render a JSON field for display, applying the unit its name implies.
pub fn format_field(key: &str, value: &Value) -> String {
    if let Some(d) = as_decimal(value) {
        if MONEY_FIELDS.contains(&key) {
            return format_eur(d);
        }
        if PCT_FIELDS.contains(&key) {
            return format_pct(d);
        }
        if HOURS_FIELDS.contains(&key) {
            return format_hours(d);
        }
    }
    format_plain(value)
}

pub fn format_plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_plain).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Decimals serialize as strings; plain JSON numbers are accepted too.
pub fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_format_eur() {
        assert_eq!(format_eur(dec!(1234.56)), "€ 1.234,56");
        assert_eq!(format_eur(dec!(1234567.891)), "€ 1.234.567,89");
        assert_eq!(format_eur(dec!(12)), "€ 12,00");
        assert_eq!(format_eur(dec!(0.005)), "€ 0,01");
        assert_eq!(format_eur(dec!(-950.5)), "€ -950,50");
        assert_eq!(format_eur(dec!(-0.001)), "€ 0,00");
    }

    #[test]
    fn test_format_pct_and_hours() {
        assert_eq!(format_pct(dec!(12.345)), "12.35%");
        assert_eq!(format_pct(dec!(-100)), "-100.00%");
        assert_eq!(format_hours(dec!(6.5)), "6.5h");
        assert_eq!(format_hours(dec!(0)), "0.0h");
    }

    #[test]
    fn test_format_field_by_name() {
        assert_eq!(format_field("revenue_sum", &json!("2500")), "€ 2.500,00");
        assert_eq!(format_field("profitability_pct", &json!("36.5")), "36.50%");
        assert_eq!(format_field("hours_rounded", &json!("8")), "8.0h");
        assert_eq!(format_field("client", &json!("ACME")), "ACME");
        assert_eq!(format_field("days_supported", &json!(null)), "-");
    }
}
