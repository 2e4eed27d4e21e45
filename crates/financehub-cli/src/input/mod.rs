pub mod file;
pub mod stdin;

use financehub_core::portfolio::Holding;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Resolve a command's input: `--input` file first, then piped stdin.
///
/// Returns `None` when neither is present so the caller can fall back to flags.
pub fn from_file_or_stdin<T: DeserializeOwned>(
    path: &Option<String>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(ref p) = path {
        return Ok(Some(file::read_document(p)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// Holdings from `--input` or stdin, as a bare array or `{"holdings": [...]}`.
pub fn holdings(path: &Option<String>) -> Result<Vec<Holding>, Box<dyn std::error::Error>> {
    let data: Value = from_file_or_stdin(path)?
        .ok_or("Provide --input <holdings file> or pipe a JSON holdings array via stdin")?;
    holdings_from_value(data)
}

fn holdings_from_value(data: Value) -> Result<Vec<Holding>, Box<dyn std::error::Error>> {
    match data {
        Value::Array(_) => Ok(serde_json::from_value(data)?),
        Value::Object(mut map) => match map.remove("holdings") {
            Some(list @ Value::Array(_)) => Ok(serde_json::from_value(list)?),
            _ => Err("JSON object must contain a 'holdings' array".into()),
        },
        _ => Err("Expected a JSON array of holdings or object with 'holdings' key".into()),
    }
}
