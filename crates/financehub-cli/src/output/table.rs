use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten_into, result_of, scalar};

/// Verdict fields rendered green/red.
const VERDICT_KEYS: [&str; 3] = ["approved", "valid", "is_gain"];

/// Format output as tables: scalar fields first, then one table per record list.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            print_fields(result);
            for (key, val) in result {
                if let Value::Array(rows) = val {
                    if rows.iter().all(Value::is_object) && !rows.is_empty() {
                        println!("\n{}:", key);
                        print_records(rows);
                    }
                }
            }
        }
        Value::Array(rows) => print_records(rows),
        other => println!("{}", scalar(other)),
    }

    if let Value::Object(envelope) = value {
        print_envelope_notes(envelope);
    }
}

fn print_fields(result: &Map<String, Value>) {
    let mut fields = Vec::new();
    for (key, val) in result {
        match val {
            Value::Array(rows) if rows.iter().any(Value::is_object) => continue,
            _ => flatten_into(key, val, &mut fields),
        }
    }
    if fields.is_empty() {
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        let shown = if VERDICT_KEYS.iter().any(|k| key.ends_with(k)) {
            verdict(&val)
        } else {
            val
        };
        builder.push_record([key, shown]);
    }
    println!("{}", Table::from(builder));
}

fn verdict(val: &str) -> String {
    match val {
        "true" => val.green().to_string(),
        "false" => val.red().to_string(),
        _ => val.to_string(),
    }
}

fn print_records(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            println!("{}", scalar(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(scalar).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
