use crate::errors::ClientError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Characters that would let a value close its quoted clause or open a new block.
const FORBIDDEN_FILTER_CHARS: &[char] = &['\'', '"', '\\', '{', '}', '\0'];

static FORBIDDEN_FILTER_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(__schema|__type|\b(mutation|subscription|fragment)\b)")
        .expect("filter denylist regex")
});

static FIELD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").expect("field name regex"));

static INTROSPECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__schema|__type\b").expect("introspection regex"));

static WRITE_OPERATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(mutation|subscription)\b").expect("operation regex"));

#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_non_empty<'a>(&self, value: &'a str, label: &str) -> Result<&'a str, ClientError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ClientError::validation(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(trimmed)
    }

    /// A value embedded in a quoted filter clause. Returned as given; empty is allowed.
    pub fn ensure_filter_value<'a>(&self, value: &'a str, label: &str) -> Result<&'a str, ClientError> {
        if let Some(ch) = value.chars().find(|c| FORBIDDEN_FILTER_CHARS.contains(c)) {
            return Err(ClientError::validation(format!(
                "{} contains forbidden character {:?}",
                label, ch
            )));
        }
        if let Some(found) = FORBIDDEN_FILTER_WORDS.find(value) {
            return Err(ClientError::validation(format!(
                "{} contains forbidden sequence '{}'",
                label,
                found.as_str()
            )));
        }
        Ok(value)
    }

    /// A caller-chosen field in a selection set.
    pub fn ensure_field_name<'a>(&self, value: &'a str) -> Result<&'a str, ClientError> {
        let trimmed = value.trim();
        if !FIELD_NAME.is_match(trimmed) {
            return Err(ClientError::validation(format!(
                "field '{}' is not a valid GraphQL field name",
                value
            )));
        }
        if trimmed.starts_with("__") {
            return Err(ClientError::validation(format!(
                "field '{}' is reserved for introspection",
                value
            )));
        }
        Ok(trimmed)
    }

    /// Raw passthrough text: non-empty, read-only, balanced, no introspection.
    pub fn ensure_read_only_query(&self, query: &str) -> Result<(), ClientError> {
        if query.trim().is_empty() {
            return Err(ClientError::validation("query must be a non-empty string"));
        }
        let stripped = strip_literals(query)?;
        if INTROSPECTION.is_match(&stripped) {
            return Err(ClientError::validation(
                "introspection queries (__schema, __type) are not allowed",
            ));
        }
        if let Some(found) = WRITE_OPERATION.find(&stripped) {
            return Err(ClientError::validation(format!(
                "only read queries are allowed (found '{}')",
                found.as_str()
            )));
        }
        let mut depth: i64 = 0;
        for ch in stripped.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ClientError::validation(
                            "query closes a selection set that was never opened",
                        ));
                    }
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(ClientError::validation("query has unbalanced braces"));
        }
        Ok(())
    }
}

fn starts_block_string(chars: &[char], at: usize) -> bool {
    chars.get(at..at + 3) == Some(&['"', '"', '"'][..])
}

/// Single left-to-right pass: comments are dropped, string and block string
/// bodies are blanked to `""`. Quotes inside a comment and `#` inside a
/// string have no effect.
fn strip_literals(query: &str) -> Result<String, ClientError> {
    let unterminated = || ClientError::validation("query has an unterminated string");
    let chars: Vec<char> = query.chars().collect();
    let mut out = String::with_capacity(query.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '#' => {
                while i < chars.len() && chars[i] != '\n' && chars[i] != '\r' {
                    i += 1;
                }
            }
            '"' if starts_block_string(&chars, i) => {
                i += 3;
                loop {
                    if i >= chars.len() {
                        return Err(unterminated());
                    }
                    if chars[i] == '\\' && starts_block_string(&chars, i + 1) {
                        i += 4;
                    } else if starts_block_string(&chars, i) {
                        i += 3;
                        break;
                    } else {
                        i += 1;
                    }
                }
                out.push_str("\"\"");
            }
            '"' => {
                i += 1;
                loop {
                    match chars.get(i) {
                        None | Some('\n') | Some('\r') => return Err(unterminated()),
                        Some('\\') => i += 2,
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                out.push_str("\"\"");
            }
            ch => {
                out.push(ch);
                i += 1;
            }
        }
    }
    Ok(out)
}
