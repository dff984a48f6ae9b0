//! Raw-record extraction: turn a trace into plain JSON for ad hoc digging,
//! without running it through the registries. Keeps the wire strings
//! verbatim (including event types the analysis side rejects) and expands
//! payload fields that are JSON encoded as strings.

use crate::error::Result;
use crate::trace::LineDiagnostic;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::io::BufRead;

#[derive(Debug, Serialize)]
pub struct ExtractedRecord {
    pub line_number: usize,
    pub timestamp: Value,
    #[serde(rename = "type")]
    pub kind: String,
    pub event: String,
    pub data: Value,
}

/// Per-trace overview of what the extraction found.
#[derive(Debug, Serialize)]
pub struct ExtractSummary {
    pub total_records: usize,
    /// Records per `type.event` pair.
    pub event_kinds: BTreeMap<String, usize>,
    /// How many records carry each data key.
    pub data_keys: BTreeMap<String, usize>,
}

/// Pull every record with a `data` object out of the stream. Lines that
/// fail to parse are reported and skipped; lines without `data` are
/// silently ignored, as are blanks.
pub fn extract_records<R: BufRead>(
    reader: R,
) -> Result<(Vec<ExtractedRecord>, Vec<LineDiagnostic>)> {
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parsed: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(err) => {
                failures.push(LineDiagnostic {
                    line: index + 1,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let Some(data) = parsed.get("data") else {
            continue;
        };

        records.push(ExtractedRecord {
            line_number: index + 1,
            timestamp: parsed.get("timestamp").cloned().unwrap_or(Value::Null),
            kind: parsed
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            event: parsed
                .get("event")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            data: expand_nested_json(data.clone()),
        });
    }

    Ok((records, failures))
}

/// Replace string fields that hold JSON documents with a
/// `{raw, parsed, type: "json_string"}` wrapper so both forms survive.
/// Only top-level fields of the data object are expanded.
fn expand_nested_json(data: Value) -> Value {
    let Value::Object(map) = data else {
        return data;
    };

    let mut expanded = Map::new();
    for (key, value) in map {
        match &value {
            Value::String(s) if looks_like_json(s) => {
                match serde_json::from_str::<Value>(s.trim()) {
                    Ok(parsed) => {
                        expanded.insert(
                            key,
                            json!({
                                "raw": s,
                                "parsed": parsed,
                                "type": "json_string",
                            }),
                        );
                    }
                    Err(_) => {
                        expanded.insert(key, value);
                    }
                }
            }
            _ => {
                expanded.insert(key, value);
            }
        }
    }
    Value::Object(expanded)
}

fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Project each record down to the requested fields. A field name matches
/// the record's own envelope fields first, then keys inside `data`.
/// Records matching none of the fields are omitted.
pub fn project_fields(records: &[ExtractedRecord], fields: &[String]) -> Vec<Value> {
    let mut projected = Vec::new();
    for record in records {
        let mut entry = Map::new();
        for field in fields {
            let value = match field.as_str() {
                "line_number" => Some(json!(record.line_number)),
                "timestamp" => Some(record.timestamp.clone()),
                "type" => Some(json!(record.kind)),
                "event" => Some(json!(record.event)),
                _ => record.data.get(field).cloned(),
            };
            if let Some(value) = value {
                entry.insert(field.clone(), value);
            }
        }
        if !entry.is_empty() {
            projected.push(Value::Object(entry));
        }
    }
    projected
}

pub fn summarize_records(records: &[ExtractedRecord]) -> ExtractSummary {
    let mut event_kinds = BTreeMap::new();
    let mut data_keys = BTreeMap::new();

    for record in records {
        let kind = format!("{}.{}", record.kind, record.event);
        *event_kinds.entry(kind).or_insert(0) += 1;

        if let Value::Object(map) = &record.data {
            for key in map.keys() {
                *data_keys.entry(key.clone()).or_insert(0) += 1;
            }
        }
    }

    ExtractSummary {
        total_records: records.len(),
        event_kinds,
        data_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_expands_nested_json() {
        let input = concat!(
            r#"{"timestamp":"2024-05-01T10:00:00Z","type":"llm_call","event":"start","data":{"id":"m1","requestText":"[{\"role\":\"user\"}]"}}"#,
            "\n",
            r#"{"timestamp":2,"type":"llm_call","event":"end","data":{"id":"m1","note":"{not json"}}"#,
            "\n",
        );
        let (records, failures) = extract_records(input.as_bytes()).unwrap();
        assert!(failures.is_empty());
        assert_eq!(records.len(), 2);

        let request = records[0].data.get("requestText").unwrap();
        assert_eq!(
            request.get("type").and_then(|v| v.as_str()),
            Some("json_string")
        );
        assert!(request.get("parsed").unwrap().is_array());
        assert!(request.get("raw").unwrap().is_string());

        // Braces alone don't make it JSON; unparseable strings stay raw
        assert!(records[1].data.get("note").unwrap().is_string());
    }

    #[test]
    fn lines_without_data_are_skipped_quietly() {
        let input = "{\"timestamp\":1,\"type\":\"llm_call\",\"event\":\"start\"}\nbroken\n";
        let (records, failures) = extract_records(input.as_bytes()).unwrap();
        assert!(records.is_empty());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].line, 2);
    }

    #[test]
    fn field_projection_reads_envelope_then_data() {
        let input = r#"{"timestamp":1,"type":"tool_call","event":"completed","data":{"id":"t1","toolName":"grep"}}"#;
        let (records, _) = extract_records(input.as_bytes()).unwrap();
        let projected = project_fields(
            &records,
            &["id".to_string(), "event".to_string(), "missing".to_string()],
        );
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].get("id").unwrap(), "t1");
        assert_eq!(projected[0].get("event").unwrap(), "completed");
        assert!(projected[0].get("missing").is_none());
    }

    #[test]
    fn summary_counts_kinds_and_keys() {
        let input = concat!(
            r#"{"timestamp":1,"type":"llm_call","event":"start","data":{"id":"m1","model":"pro"}}"#,
            "\n",
            r#"{"timestamp":2,"type":"llm_call","event":"end","data":{"id":"m1"}}"#,
            "\n",
        );
        let (records, _) = extract_records(input.as_bytes()).unwrap();
        let summary = summarize_records(&records);
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.event_kinds.get("llm_call.start"), Some(&1));
        assert_eq!(summary.event_kinds.get("llm_call.end"), Some(&1));
        assert_eq!(summary.data_keys.get("id"), Some(&2));
        assert_eq!(summary.data_keys.get("model"), Some(&1));
    }
}
