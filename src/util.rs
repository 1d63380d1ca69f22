//! Small helpers shared across modules: JSON field accessors for the loosely
//! typed catalog payloads, URL encoding, and epoch timestamps.

use serde_json::Value;

/// Percent-encode a query string for use in a URL query component.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push_str("%20"),
            _ => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
    out
}

/// String field accessor returning an owned, possibly empty string.
pub fn s(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Optional string field accessor; absent, null, and empty all map to `None`.
pub fn opt_s(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Floating point field accessor; integers are widened.
pub fn f64_of(v: &Value, key: &str) -> f64 {
    v.get(key).and_then(Value::as_f64).unwrap_or_default()
}

/// Unsigned integer field accessor tolerating string-typed numbers.
pub fn u64_of(v: &Value, key: &str) -> Option<u64> {
    let n = v.get(key)?;
    if let Some(u) = n.as_u64() {
        return Some(u);
    }
    if let Some(s) = n.as_str()
        && let Ok(p) = s.parse::<u64>()
    {
        return Some(p);
    }
    None
}

/// Array-of-u64 field accessor (e.g. TMDB `genre_ids`).
pub fn arr_u64(v: &Value, key: &str) -> Vec<u64> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default()
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
