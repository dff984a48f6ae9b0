//! Sub-call under-reporting heuristic.
//!
//! Completed model responses mention the function calls the model asked
//! for; every one of those should eventually show up as a tool-call record
//! in the same trace. When the mentions outnumber the records, something
//! between request and execution went unlogged. This is a text-scanning
//! heuristic: it can overcount (a response quoting JSON, say) and its
//! output is advisory only. It never gates the merge or the timeline.

use crate::trace::TraceAnalysis;
use gantry_types::{Anomaly, Phase};
use regex::Regex;
use serde_json::Value;

const FUNCTION_CALL_MARKER: &str = "functionCall";

/// Compare function-call mentions in completed model responses against
/// recorded tool calls. `None` means nothing suspicious.
pub fn check(analysis: &TraceAnalysis) -> Option<Anomaly> {
    let marker = Regex::new(&format!(r#""{}""#, FUNCTION_CALL_MARKER)).ok()?;

    let mut expected = 0;
    for call in analysis.models.iter() {
        if !matches!(call.last_phase, Phase::End | Phase::Completed) {
            continue;
        }
        if let Some(response) = &call.response_text {
            expected += marker.find_iter(&render(response)).count();
        }
    }

    let observed = analysis.tools.len();
    if expected > observed {
        Some(Anomaly {
            expected,
            observed,
            possible_causes: vec![
                "tool execution failed before it was logged".to_string(),
                "tool call was cancelled by the user".to_string(),
                "monitoring gap: tool events missing from the trace".to_string(),
            ],
        })
    } else {
        None
    }
}

/// Serialize structured responses so the marker keeps its quoted-key form;
/// strings are scanned as-is since they already contain the raw JSON text.
fn render(response: &Value) -> String {
    match response {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
