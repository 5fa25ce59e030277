use serde_json::Value;

/// Headline values, looked up by path inside the `result` envelope.
const PRIORITY_PATHS: [&str; 4] = [
    "summary.npv.mean",
    "summary.irr_pct.mean",
    "npv",
    "irr_pct",
];

/// Print just the key answer from the output.
///
/// Object results print the first headline value found; row results (KPI
/// table, projection records) print one tab-separated line per row.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Array(rows) => {
            for row in rows {
                match row {
                    Value::Object(map) => {
                        let cells: Vec<String> = map.values().map(format_minimal).collect();
                        println!("{}", cells.join("\t"));
                    }
                    other => println!("{}", format_minimal(other)),
                }
            }
        }
        Value::Object(map) => {
            for path in PRIORITY_PATHS {
                if let Some(val) = lookup(result, path).filter(|v| !v.is_null()) {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
            }
        }
        other => println!("{}", format_minimal(other)),
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "NaN".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_dotted_path() {
        let v = json!({ "summary": { "npv": { "mean": 12.5 } } });
        assert_eq!(lookup(&v, "summary.npv.mean"), Some(&json!(12.5)));
        assert_eq!(lookup(&v, "summary.irr_pct.mean"), None);
    }
}
