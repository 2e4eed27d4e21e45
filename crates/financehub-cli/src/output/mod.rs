pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};
use std::io::{self, Write};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = serde_json::to_writer_pretty(&mut out, value).and_then(|_| {
        writeln!(out).map_err(serde_json::Error::io)
    }) {
        eprintln!("JSON serialization error: {}", e);
    }
}

/// The payload of a `ComputationOutput` envelope, or the value itself for
/// commands that return bare JSON.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// First field holding a non-empty array of records (slices, holdings, yearly path).
pub(crate) fn record_array(map: &Map<String, Value>) -> Option<(&str, &[Value])> {
    map.iter().find_map(|(key, val)| match val {
        Value::Array(items) if matches!(items.first(), Some(Value::Object(_))) => {
            Some((key.as_str(), items.as_slice()))
        }
        _ => None,
    })
}

/// Plain-text rendering of a JSON leaf.
pub(crate) fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten nested objects into dotted keys; arrays stay as JSON text.
pub(crate) fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&path, val, out);
            }
        }
        _ => out.push((prefix.to_string(), scalar(value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_of_unwraps_envelope() {
        let v = json!({ "result": { "monthly_payment": "401.94" }, "warnings": [] });
        assert_eq!(result_of(&v)["monthly_payment"], "401.94");
        let bare = json!({ "valid": true });
        assert_eq!(result_of(&bare), &bare);
    }

    #[test]
    fn test_record_array_skips_scalars() {
        let v = json!({
            "total_value": "100",
            "slices": [{ "label": "stocks", "value": 100 }],
        });
        let (key, rows) = record_array(v.as_object().unwrap()).unwrap();
        assert_eq!(key, "slices");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_flatten_nested_holding() {
        let v = json!({ "holding": { "symbol": "ENI", "shares": "10" }, "total_cost": "145" });
        let mut rows = Vec::new();
        flatten_into("", &v, &mut rows);
        assert!(rows.contains(&("holding.symbol".to_string(), "ENI".to_string())));
        assert!(rows.contains(&("total_cost".to_string(), "145".to_string())));
    }
}
