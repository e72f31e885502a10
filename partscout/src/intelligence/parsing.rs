use std::collections::HashSet;

use serde_json::Value;

/// Extracts product ids from a similarity answer, in the order the model gave
/// them and without duplicates.
///
/// A JSON array is expected. Anything else is treated as a delimited list;
/// segments are stripped of bracket and quote noise, and segments that are
/// empty or still contain whitespace are dropped.
pub fn parse_product_ids(response: &str) -> Vec<String> {
    let body = strip_code_fence(response.trim());

    if let Ok(values) = serde_json::from_str::<Vec<Value>>(body) {
        let ids = values.into_iter().filter_map(|value| match value {
            Value::String(id) => clean_segment(&id),
            Value::Number(id) => Some(id.to_string()),
            other => {
                tracing::warn!(value = %other, "Ignoring non-scalar product id");
                None
            }
        });
        return dedupe(ids);
    }

    tracing::debug!("Similarity answer is not a JSON array, splitting on delimiters");
    dedupe(body.split([',', '\n']).filter_map(clean_segment))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn clean_segment(segment: &str) -> Option<String> {
    let cleaned = segment
        .trim()
        .trim_matches(|c: char| matches!(c, '[' | ']' | '"' | '\'' | '`'))
        .trim();

    if cleaned.is_empty() {
        return None;
    }
    if cleaned.chars().any(char::is_whitespace) {
        tracing::warn!(segment = %cleaned, "Dropping malformed product id");
        return None;
    }

    Some(cleaned.to_string())
}

fn dedupe(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}
