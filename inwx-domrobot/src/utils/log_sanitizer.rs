//! Log sanitization utilities
//!
//! Keeps credentials (`pass`, `tan`) out of debug logs and stops large
//! response bodies (zone listings, DNSSEC keys) from flooding them.

use serde_json::{Map, Value};

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 512;

/// Parameter names whose values never reach a log line.
const SECRET_KEYS: &[&str] = &["pass", "password", "tan"];

const REDACTED: &str = "********";

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Returns the original string if it's within the limit,
/// otherwise returns the first `TRUNCATE_LIMIT` characters with a suffix
/// indicating the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Copy of `params` with secret values replaced, for logging only.
pub fn redact_params(params: &Map<String, Value>) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(key, value)| {
                if SECRET_KEYS.contains(&key.as_str()) {
                    (key.clone(), Value::String(REDACTED.to_string()))
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect(),
    )
}
