//! Lenient parsing of JSON replies from chat models

use crate::crawler::StructuredData;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```(?:json)?\s*").expect("fence pattern is valid"))
}

/// Parses a model reply into a mapping
///
/// Code fences are stripped and surrounding prose is cut away. Anything that
/// does not yield a JSON object becomes an empty mapping.
///
/// # Examples
///
/// ```
/// use gleaner::extract::parse_json_reply;
///
/// let data = parse_json_reply("Sure! ```json\n{\"a\": 1}\n``` Hope that helps.");
/// assert_eq!(data["a"], 1);
/// assert!(parse_json_reply("no json here").is_empty());
/// ```
pub fn parse_json_reply(reply: &str) -> StructuredData {
    if reply.trim().is_empty() {
        tracing::warn!("Empty response received from model");
        return StructuredData::new();
    }

    let cleaned = code_fence().replace_all(reply, "");
    let candidate = json_candidate(cleaned.trim());

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!("Model reply is JSON but not an object: {}", kind_of(&other));
            StructuredData::new()
        }
        Err(e) => {
            tracing::warn!("Failed to parse JSON reply: {}", e);
            StructuredData::new()
        }
    }
}

/// Picks the slice of `text` most likely to hold the JSON payload
fn json_candidate(text: &str) -> &str {
    if (text.starts_with('{') && text.ends_with('}'))
        || (text.starts_with('[') && text.ends_with(']'))
    {
        return text;
    }

    enclosed(text, '{', '}')
        .or_else(|| enclosed(text, '[', ']'))
        .unwrap_or(text)
}

fn enclosed(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
