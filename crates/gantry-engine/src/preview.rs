//! Display-text heuristics for raw request/response payloads.
//!
//! Everything here is best-effort string extraction for hover text and
//! summaries. Nothing downstream of the merge logic depends on it.

use gantry_types::util::truncate;
use serde_json::Value;

const PREVIEW_LEN: usize = 80;

/// First user-authored text inside a logged request body.
///
/// Requests are either a JSON string or an already-parsed array of
/// `{role, parts: [{text}]}` turns; anything else falls back to a
/// truncated rendering of the whole value.
pub fn request_preview(request: &Value) -> Option<String> {
    let parsed = reparse(request);
    if let Value::Array(turns) = &parsed {
        for turn in turns {
            if turn.get("role").and_then(|r| r.as_str()) != Some("user") {
                continue;
            }
            if let Some(text) = first_part_text(turn) {
                return Some(truncate(text, PREVIEW_LEN));
            }
        }
    }
    Some(truncate(&render(&parsed), PREVIEW_LEN))
}

/// First candidate text inside a logged response body.
pub fn response_preview(response: &Value) -> Option<String> {
    let parsed = reparse(response);
    if let Some(candidates) = parsed.get("candidates").and_then(|c| c.as_array()) {
        for candidate in candidates {
            if let Some(text) = candidate.get("content").and_then(first_part_text) {
                return Some(truncate(text, PREVIEW_LEN));
            }
        }
    }
    Some(truncate(&render(&parsed), PREVIEW_LEN))
}

/// Compact `k=v` rendering of a tool's argument object, capped at three
/// entries.
pub fn args_preview(args: &Value) -> Option<String> {
    let map = args.as_object()?;
    if map.is_empty() {
        return None;
    }
    let mut parts: Vec<String> = map
        .iter()
        .take(3)
        .map(|(key, value)| format!("{}={}", key, truncate(&render(value), 40)))
        .collect();
    if map.len() > 3 {
        parts.push("...".to_string());
    }
    Some(parts.join(", "))
}

/// "read_file" -> "Read File", for bar labels.
pub fn title_case_tool(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Payloads are sometimes logged as JSON-encoded strings; parse those back
/// into structure before inspecting them.
fn reparse(value: &Value) -> Value {
    if let Value::String(s) = value {
        let trimmed = s.trim();
        if (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']'))
        {
            if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
                return parsed;
            }
        }
    }
    value.clone()
}

fn first_part_text(content: &Value) -> Option<&str> {
    content
        .get("parts")
        .and_then(|p| p.as_array())?
        .iter()
        .find_map(|part| part.get("text").and_then(|t| t.as_str()))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
