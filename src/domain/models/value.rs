//! Coercion helpers over untyped config values.

use serde_json::Value;

/// Human-readable name of a JSON value's runtime type, used in error
/// messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a value as a signed integer. Accepts any numeric representation;
/// floating-point values truncate toward zero.
pub fn as_integer(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    let f = number.as_f64()?;
    let truncated = f.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Read a value as an unsigned integer. Negative values are rejected.
pub fn as_unsigned(value: &Value) -> Option<u64> {
    let number = value.as_number()?;
    if let Some(u) = number.as_u64() {
        return Some(u);
    }
    let f = number.as_f64()?;
    let truncated = f.trunc();
    if truncated < 0.0 || truncated > u64::MAX as f64 {
        return None;
    }
    Some(truncated as u64)
}

/// Parse a boolean from its string form. Accepts the same token set as the
/// override variables: `1`, `t`, `T`, `TRUE`, `true`, `True` and their
/// false counterparts.
pub fn parse_boolean(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Split a comma-separated list into its elements. A surrounding bracket
/// pair and any double quotes are stripped first, elements are trimmed.
pub fn split_list(raw: &str) -> Vec<String> {
    let mut inner = raw.trim();
    inner = inner.strip_prefix('[').unwrap_or(inner);
    inner = inner.strip_suffix(']').unwrap_or(inner);
    let unquoted = inner.replace('"', "");

    unquoted
        .split(',')
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .map(str::to_string)
        .collect()
}
