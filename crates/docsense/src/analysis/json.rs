//! Best-effort JSON object extraction from free-form model output

use serde_json::{Map, Value};

/// Key holding the unparsed model output in a degraded result
pub const RAW_RESPONSE_KEY: &str = "raw_response";

/// Outcome of [`extract_json`]
#[derive(Debug, Clone, PartialEq)]
pub enum JsonExtraction {
    /// A JSON object was recovered
    Parsed(Map<String, Value>),
    /// Nothing parseable; carries the raw text verbatim
    Degraded(String),
}

impl JsonExtraction {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// Field map; a degraded extraction becomes `{"raw_response": <raw>}`
    pub fn into_fields(self) -> Map<String, Value> {
        match self {
            Self::Parsed(fields) => fields,
            Self::Degraded(raw) => {
                let mut fields = Map::new();
                fields.insert(RAW_RESPONSE_KEY.to_string(), Value::String(raw));
                fields
            }
        }
    }
}

/// Recover a JSON object from model output.
///
/// Tries the whole (trimmed) text first, then every balanced `{...}`
/// substring from longest to shortest. Never fails.
pub fn extract_json(text: &str) -> JsonExtraction {
    if let Some(object) = parse_object(text.trim()) {
        return JsonExtraction::Parsed(object);
    }

    let mut candidates = balanced_brace_candidates(text);
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));

    for candidate in candidates {
        if let Some(object) = parse_object(candidate) {
            return JsonExtraction::Parsed(object);
        }
    }

    tracing::warn!("No JSON object found in model output ({} bytes)", text.len());
    JsonExtraction::Degraded(text.to_string())
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Every balanced `{...}` substring, found in one pass.
///
/// Quotes only open strings inside a brace, so stray quotes in surrounding
/// prose do not hide the object that follows.
fn balanced_brace_candidates(text: &str) -> Vec<&str> {
    let mut open: Vec<usize> = Vec::new();
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' if !open.is_empty() => in_string = !in_string,
            '{' if !in_string => open.push(i),
            '}' if !in_string => {
                if let Some(start) = open.pop() {
                    ranges.push((start, i + 1));
                }
            }
            _ => {}
        }
    }

    ranges.sort_by_key(|&(start, _)| start);
    ranges.into_iter().map(|(start, end)| &text[start..end]).collect()
}
