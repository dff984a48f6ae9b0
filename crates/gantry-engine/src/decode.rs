use crate::error::{Error, Result};
use chrono::DateTime;
use gantry_types::{CallCategory, EventEnvelope, Phase, Protocol};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Wire shape of one log line. Everything is optional at this level so a
/// single missing field produces a targeted diagnostic instead of a serde
/// type error.
#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
    event: Option<String>,
    data: Option<Map<String, Value>>,
}

/// Decode one non-blank line into an event envelope.
///
/// The envelope is the decoder's whole contract: category, phase, protocol,
/// and a normalized epoch-millisecond timestamp. Payload semantics are left
/// to the registries.
pub fn decode_line(line: &str) -> Result<EventEnvelope> {
    let raw: RawRecord = serde_json::from_str(line)?;

    let kind = raw
        .kind
        .ok_or_else(|| Error::Decode("missing type field".to_string()))?;
    let category = CallCategory::from_wire(&kind)
        .ok_or_else(|| Error::Decode(format!("unknown event type: {}", kind)))?;

    let phase_name = raw
        .event
        .ok_or_else(|| Error::Decode("missing event field".to_string()))?;
    let phase = Phase::from_wire(&phase_name);

    let timestamp_ms = raw
        .timestamp
        .as_ref()
        .and_then(parse_timestamp_ms)
        .ok_or_else(|| Error::Decode("missing or unparseable timestamp".to_string()))?;

    let payload = raw.data.unwrap_or_default();
    let protocol = detect_protocol(&phase, &payload);

    Ok(EventEnvelope {
        timestamp_ms,
        category,
        phase,
        protocol,
        payload,
    })
}

/// Accepts ISO-8601 strings or epoch milliseconds (integer or float).
fn parse_timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.timestamp_millis());
            }
            s.parse::<i64>().ok()
        }
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

/// Split vs fused detection, done once per event.
///
/// `start`/`end` pairs are the split protocol. `completed`/`cancelled`
/// singletons are fused. An `error` event is fused when its payload carries
/// both instants, split otherwise. Phases outside the call lifecycle
/// (approvals, unknown names) default to split; the registries never
/// consult protocol for them.
fn detect_protocol(phase: &Phase, payload: &Map<String, Value>) -> Protocol {
    match phase {
        Phase::Completed | Phase::Cancelled => Protocol::Fused,
        Phase::Error => {
            let has_both = payload.get("startTime").map(|v| !v.is_null()).unwrap_or(false)
                && payload.get("endTime").map(|v| !v.is_null()).unwrap_or(false);
            if has_both {
                Protocol::Fused
            } else {
                Protocol::Split
            }
        }
        _ => Protocol::Split,
    }
}
