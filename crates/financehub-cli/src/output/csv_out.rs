use serde_json::Value;
use std::io;

use super::{flatten_into, record_array, result_of};

/// Write output as CSV to stdout.
///
/// A result carrying a list of records (allocation slices, holdings, the
/// yearly projection) is written one row per record; anything else becomes
/// a two-column `field,value` listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match result_of(value) {
        Value::Object(map) => match record_array(map) {
            Some((_, rows)) => write_records(&mut wtr, rows),
            None => write_fields(&mut wtr, &Value::Object(map.clone())),
        },
        Value::Array(rows) => write_records(&mut wtr, rows),
        other => write_fields(&mut wtr, other),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    let mut fields = Vec::new();
    flatten_into("", value, &mut fields);
    wtr.write_record(["field", "value"])?;
    for (key, val) in fields {
        wtr.write_record([key, val])?;
    }
    Ok(())
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    wtr.write_record(&headers)?;
    for item in rows {
        let mut flat = Vec::new();
        flatten_into("", item, &mut flat);
        let row: Vec<String> = headers
            .iter()
            .map(|h| {
                flat.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}
