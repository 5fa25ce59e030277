use serde_json::Value;
use std::io;

use crate::output::table::flatten;

/// Write output as CSV to stdout.
///
/// Row-shaped results (projection records, KPI rows) become one CSV row per
/// element; object results become `field,value` pairs with dotted names.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        Value::Object(map) => {
            let mut rows = Vec::new();
            flatten("", map, &mut rows);
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in rows {
                let _ = wtr.write_record([key, val]);
            }
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(body)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

/// Full precision; NaN cells (serialised as null) stay empty.
fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
