use colored::Colorize;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};
use tabled::{builder::Builder, settings::Style, Table};

use super::format::{as_decimal, format_field, format_plain};

/// Rows at or below this profitability are flagged.
const LOW_PROFITABILITY_PCT: Decimal = dec!(30);

/// Column order for row tables; unknown keys follow in name order.
const COLUMN_ORDER: &[&str] = &[
    "year",
    "month",
    "client",
    "project",
    "record_count",
    "revenue",
    "revenue_sum",
    "cost",
    "cost_sum",
    "margin",
    "margin_sum",
    "profitability_pct",
    "days_supported",
    "weight",
    "hours_precise",
    "hours_rounded",
    "simulated_cost",
    "new_total_cost",
    "adjusted_profitability_pct",
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_object(res_map),
        other => println!("{}", format_plain(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Scalars first as a Field/Value table, then one section per nested object
/// and one row table per array of objects.
fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut scalar_count = 0;
    for (key, val) in map {
        if is_section(val) {
            continue;
        }
        builder.push_record([key.as_str(), &format_field(key, val)]);
        scalar_count += 1;
    }
    if scalar_count > 0 {
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        match val {
            Value::Object(section) if !is_choice(val) => {
                println!("\n{}", title(key).bold());
                print_section(section);
            }
            Value::Array(arr) if arr.iter().any(Value::is_object) => {
                println!("\n{}", title(key).bold());
                print_array_table(arr);
            }
            _ => {}
        }
    }
}

fn print_section(section: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in section {
        let shown = if is_choice(val) {
            describe_choice(val)
        } else {
            format_field(key, val)
        };
        builder.push_record([key.as_str(), &shown]);
    }
    println!("{}", Table::from(builder));
}

/// One line per row: rows receiving hours in green, low-profitability rows in red.
fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let objects: Vec<&Map<String, Value>> = arr.iter().filter_map(Value::as_object).collect();
    if objects.is_empty() {
        for item in arr {
            println!("{}", format_plain(item));
        }
        return;
    }

    let headers = column_order(&objects);
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| title(h)));
    for map in &objects {
        let row: Vec<String> = headers
            .iter()
            .map(|h| map.get(h.as_str()).map(|v| format_field(h, v)).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }

    let mut table = Table::from(builder);
    table.with(Style::psql());
    let rendered = table.to_string();

    // psql style: header, separator, then exactly one line per row
    for (i, line) in rendered.lines().enumerate() {
        match i.checked_sub(2).and_then(|r| objects.get(r)) {
            Some(map) => println!("{}", highlight(line, map)),
            None => println!("{}", line),
        }
    }
}

fn highlight(line: &str, row: &Map<String, Value>) -> String {
    let decimal = |key: &str| row.get(key).and_then(as_decimal);
    if decimal("hours_rounded").is_some_and(|h| h > Decimal::ZERO) {
        return line.green().to_string();
    }
    if decimal("profitability_pct").is_some_and(|p| p <= LOW_PROFITABILITY_PCT) {
        return line.red().to_string();
    }
    line.to_string()
}

pub(crate) fn column_order(rows: &[&Map<String, Value>]) -> Vec<String> {
    let mut present: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !present.contains(key) {
                present.push(key.clone());
            }
        }
    }
    let mut ordered: Vec<String> = COLUMN_ORDER
        .iter()
        .filter(|c| present.iter().any(|p| p == *c))
        .map(|c| c.to_string())
        .collect();
    for key in present {
        if !ordered.contains(&key) {
            ordered.push(key);
        }
    }
    ordered
}

fn is_section(value: &Value) -> bool {
    match value {
        Value::Object(_) => !is_choice(value),
        Value::Array(arr) => arr.iter().any(Value::is_object),
        _ => false,
    }
}

/// A serialized filter choice: `"all"` or `{"only": [...]}`.
fn is_choice(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.len() == 1 && map.contains_key("only"),
        _ => false,
    }
}

fn describe_choice(value: &Value) -> String {
    match value.get("only") {
        Some(values) => format_plain(values),
        None => format_plain(value),
    }
}

fn title(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
