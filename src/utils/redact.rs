use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const REDACTION: &str = "[REDACTED]";

const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "token",
    "access_token",
    "api_key",
    "apikey",
    "authorization",
    "x-api-key",
    "credential",
    "secret",
];

static INLINE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(Bearer)\s+([A-Za-z0-9._~+/=-]{6,})").expect("inline redaction regex"),
            "$1 [REDACTED]",
        ),
        (
            Regex::new(r#"(?i)\b(password|token|api[_-]?key|access[_-]?token)\b(["']?\s*[:=]\s*["']?)([^\s"',}]+)"#)
                .expect("inline redaction regex"),
            "$1$2[REDACTED]",
        ),
    ]
});

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    SENSITIVE_KEYS.contains(&normalized.as_str())
        || normalized.contains("secret")
        || normalized.contains("token")
        || normalized.contains("password")
}

/// Replaces values under sensitive keys, recursively.
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| {
                    if is_sensitive_key(key) && !val.is_null() {
                        (key.clone(), Value::String(REDACTION.to_string()))
                    } else {
                        (key.clone(), redact_value(val))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        Value::String(text) => Value::String(redact_text(text, usize::MAX)),
        other => other.clone(),
    }
}

/// Masks inline credentials and caps the result at `max_bytes`.
pub fn redact_text(text: &str, max_bytes: usize) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in INLINE_PATTERNS.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    if out.len() > max_bytes {
        let mut end = max_bytes;
        while end > 0 && !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
        out.push_str("...");
    }
    out
}
