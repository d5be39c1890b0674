use std::fmt;

use serde_json::Value as JsonValue;

/// Maximum number of characters kept when previewing a sampled value.
pub const PREVIEW_CHARS: usize = 100;

const RECORD_ID_LEN: usize = 17;

/// A loosely-typed field value as observed in a sampled record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<String>),
    /// Structured value outside the other shapes, kept as its JSON text.
    Other(String),
}

impl FieldValue {
    /// Converts a JSON value; `null` is absent and yields `None`.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let converted = match value {
            JsonValue::Null => return None,
            JsonValue::Bool(b) => FieldValue::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => FieldValue::String(s.clone()),
            JsonValue::Array(items) => FieldValue::List(
                items
                    .iter()
                    .map(|item| match item {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            JsonValue::Object(_) => FieldValue::Other(value.to_string()),
        };
        Some(converted)
    }

    /// Types a raw CSV cell; empty cells are absent.
    pub fn from_cell(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Some(FieldValue::Integer(i));
        }
        if let Ok(f) = trimmed.parse::<f64>()
            && f.is_finite()
        {
            return Some(FieldValue::Float(f));
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Some(FieldValue::Boolean(true));
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Some(FieldValue::Boolean(false));
        }
        if let Some(ids) = parse_record_ids(trimmed) {
            return Some(FieldValue::List(ids));
        }
        Some(FieldValue::String(raw.to_string()))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Integer(_) | FieldValue::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => format!("{f:?}"),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::List(items) => {
                let quoted = items
                    .iter()
                    .map(|item| format!("{item:?}"))
                    .collect::<Vec<_>>();
                format!("[{}]", quoted.join(", "))
            }
            FieldValue::Other(raw) => raw.clone(),
        }
    }

    /// Display form cut to [`PREVIEW_CHARS`] characters.
    pub fn preview(&self) -> String {
        truncate_chars(&self.as_display(), PREVIEW_CHARS)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}

// A CSV export flattens link fields to "recA,recB". Only accept the list form
// when every item has the shape of a record id (`rec` + 14 alphanumerics).
fn parse_record_ids(value: &str) -> Option<Vec<String>> {
    let ids = value
        .split(',')
        .map(str::trim)
        .map(str::to_string)
        .collect::<Vec<_>>();
    let all_ids = ids.iter().all(|id| {
        id.len() == RECORD_ID_LEN && id.starts_with("rec") && id.chars().all(|c| c.is_ascii_alphanumeric())
    });
    all_ids.then_some(ids)
}
