//! JavaScript literal formatting for generated modules.

/// A JavaScript string literal. JSON string syntax is valid JavaScript.
pub(crate) fn string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// A JavaScript array literal of strings.
pub(crate) fn string_array<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    let items: Vec<String> = values.into_iter().map(|value| string(value)).collect();
    format!("[{}]", items.join(", "))
}
