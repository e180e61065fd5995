use serde_json::{Map, Value};
use std::io;

use super::format::format_plain;
use super::table::column_order;

/// Write output as CSV to stdout.
///
/// A result carrying `rows` is written as one CSV line per row; any other
/// object becomes a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Object(map) => match map.get("rows") {
            Some(Value::Array(rows)) => write_array_csv(&mut wtr, rows),
            _ => write_fields_csv(&mut wtr, map),
        },
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(body)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields_csv<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let objects: Vec<&Map<String, Value>> = arr.iter().filter_map(Value::as_object).collect();
    if objects.is_empty() {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    }

    let headers = column_order(&objects);
    let _ = wtr.write_record(&headers);
    for map in objects {
        let row: Vec<String> = headers
            .iter()
            .map(|h| map.get(h.as_str()).map(format_csv_value).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}

/// Raw values, so amounts stay machine-readable.
fn format_csv_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => format_plain(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(arr: &[Value]) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_array_csv(&mut wtr, arr);
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_rows_as_csv() {
        let rows = vec![
            json!({"project": "Portal", "client": "ACME", "hours_rounded": "6.5"}),
            json!({"project": "ERP", "client": "Globex", "hours_rounded": "1.5", "days_supported": null}),
        ];
        assert_eq!(
            render(&rows),
            "client,project,days_supported,hours_rounded\nACME,Portal,,6.5\nGlobex,ERP,,1.5\n"
        );
    }
}
