use serde_json::Value;

use super::{result_of, scalar};

/// Headline field of each command, in priority order.
const PRIORITY_KEYS: [&str; 10] = [
    "monthly_payment",
    "future_value",
    "gain_loss",
    "total_gain_loss",
    "approved",
    "valid",
    "category",
    "total_cost",
    "proceeds",
    "total_value",
];

/// Print just the key answer value from the output.
///
/// Allocation results print one `label value` line per slice; everything
/// else prints the first priority field present, then the first field.
pub fn print_minimal(value: &Value) {
    for line in minimal_lines(result_of(value)) {
        println!("{}", line);
    }
}

fn minimal_lines(result: &Value) -> Vec<String> {
    let Value::Object(map) = result else {
        return vec![scalar(result)];
    };

    if let Some(Value::Array(slices)) = map.get("slices") {
        return slices
            .iter()
            .map(|s| format!("{} {}", scalar(&s["label"]), scalar(&s["value"])))
            .collect();
    }

    if let Some(val) = PRIORITY_KEYS
        .iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
    {
        return vec![scalar(val)];
    }

    map.iter()
        .next()
        .map(|(key, val)| vec![format!("{}: {}", key, scalar(val))])
        .unwrap_or_default()
}
