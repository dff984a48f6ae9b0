//! Protocol-aware field merging, implemented once per call category.
//!
//! Both log protocols flow through the same rules: a field present in the
//! incoming payload overwrites the stored value, an absent field never
//! clears one. A split `start` happens to carry timing/identity fields and
//! a split `end` happens to carry result fields; a fused terminal carries
//! everything at once. The merge does not branch on protocol, only on what
//! the payload contains and whether the phase is terminal.

use crate::payload::Payload;
use crate::registry::ApplyEvent;
use gantry_types::{EmbeddingCall, EventEnvelope, ModelCall, Phase, ToolCall};

/// Shared skeleton merge: status, last phase, instants, reported duration.
///
/// A terminal event without an `endTime` falls back to its own payload's
/// `startTime`, matching the upstream runtime's fused error records.
struct Lifecycle<'a> {
    status: &'a mut String,
    last_phase: &'a mut Phase,
    start_time_ms: &'a mut Option<i64>,
    end_time_ms: &'a mut Option<i64>,
    duration_ms: &'a mut Option<i64>,
}

fn merge_lifecycle(fields: Lifecycle<'_>, envelope: &EventEnvelope) {
    let payload = Payload::new(&envelope.payload);

    *fields.status = match payload.non_empty_str("status") {
        Some(status) => status.to_string(),
        None => envelope.phase.name().to_string(),
    };
    *fields.last_phase = envelope.phase.clone();

    if let Some(start) = payload.i64_field("startTime") {
        *fields.start_time_ms = Some(start);
    }
    match payload.i64_field("endTime") {
        Some(end) => *fields.end_time_ms = Some(end),
        None => {
            if envelope.phase.is_terminal()
                && let Some(start) = payload.i64_field("startTime")
            {
                *fields.end_time_ms = Some(start);
            }
        }
    }
    if let Some(duration) = payload.i64_field("duration") {
        *fields.duration_ms = Some(duration);
    }
}

impl ApplyEvent for ModelCall {
    fn new(id: String) -> Self {
        ModelCall::new(id)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, envelope: EventEnvelope) {
        merge_lifecycle(
            Lifecycle {
                status: &mut self.status,
                last_phase: &mut self.last_phase,
                start_time_ms: &mut self.start_time_ms,
                end_time_ms: &mut self.end_time_ms,
                duration_ms: &mut self.duration_ms,
            },
            &envelope,
        );

        let payload = Payload::new(&envelope.payload);
        if let Some(model) = payload.non_empty_str("model") {
            self.model = Some(model.to_string());
        }
        if let Some(prompt_id) = payload.non_empty_str("promptId") {
            self.prompt_id = Some(prompt_id.to_string());
        }
        if let Some(tokens) = payload.u64_field("totalTokens") {
            self.total_tokens = Some(tokens);
        }
        if let Some(request) = payload.value_field("requestText") {
            self.request_text = Some(request);
        }
        if let Some(response) = payload.value_field("responseText") {
            self.response_text = Some(response);
        }
        if let Some(error) = payload.non_empty_str("error") {
            self.error = Some(error.to_string());
        }

        self.events.push(envelope);
    }
}

impl ApplyEvent for ToolCall {
    fn new(id: String) -> Self {
        ToolCall::new(id)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, envelope: EventEnvelope) {
        merge_lifecycle(
            Lifecycle {
                status: &mut self.status,
                last_phase: &mut self.last_phase,
                start_time_ms: &mut self.start_time_ms,
                end_time_ms: &mut self.end_time_ms,
                duration_ms: &mut self.duration_ms,
            },
            &envelope,
        );

        let payload = Payload::new(&envelope.payload);
        if let Some(name) = payload.non_empty_str("toolName") {
            self.tool_name = Some(name.to_string());
        }
        if let Some(call_id) = payload.non_empty_str("callId") {
            self.call_id = Some(call_id.to_string());
        }
        if let Some(prompt_id) = payload.non_empty_str("promptId") {
            self.prompt_id = Some(prompt_id.to_string());
        }
        if let Some(args) = payload.value_field("args") {
            self.args = Some(args);
        }
        if let Some(start) = payload.i64_field("executionStartTime") {
            self.execution_start_time_ms = Some(start);
        }
        if let Some(end) = payload.i64_field("executionEndTime") {
            self.execution_end_time_ms = Some(end);
        }
        if let Some(duration) = payload.i64_field("executionDuration") {
            self.execution_duration_ms = Some(duration);
        }
        if let Some(duration) = payload.i64_field("pureExecutionDuration") {
            self.pure_execution_duration_ms = Some(duration);
        }
        if let Some(wait) = payload.i64_field("awaitingApprovalDuration") {
            self.awaiting_approval_duration_ms = Some(wait);
        }
        if let Some(result) = payload.non_empty_str("result") {
            self.result = Some(result.to_string());
        }
        if let Some(display) = payload.non_empty_str("resultDisplay") {
            self.result_display = Some(display.to_string());
        }
        if let Some(error) = payload.non_empty_str("error") {
            self.error = Some(error.to_string());
        }

        self.events.push(envelope);
    }
}

impl ApplyEvent for EmbeddingCall {
    fn new(id: String) -> Self {
        EmbeddingCall::new(id)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, envelope: EventEnvelope) {
        merge_lifecycle(
            Lifecycle {
                status: &mut self.status,
                last_phase: &mut self.last_phase,
                start_time_ms: &mut self.start_time_ms,
                end_time_ms: &mut self.end_time_ms,
                duration_ms: &mut self.duration_ms,
            },
            &envelope,
        );

        let payload = Payload::new(&envelope.payload);
        if let Some(model) = payload.non_empty_str("model") {
            self.model = Some(model.to_string());
        }
        if let Some(count) = payload.u64_field("textCount") {
            self.text_count = Some(count);
        }
        if let Some(dimensions) = payload.u64_field("dimensions") {
            self.dimensions = Some(dimensions);
        }
        if let Some(texts) = payload.value_field("texts") {
            self.texts = Some(texts);
        }
        if let Some(error) = payload.non_empty_str("error") {
            self.error = Some(error.to_string());
        }

        self.events.push(envelope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_types::{CallCategory, Protocol};
    use serde_json::{Value, json};

    fn envelope(
        category: CallCategory,
        phase: Phase,
        protocol: Protocol,
        payload: Value,
    ) -> EventEnvelope {
        EventEnvelope {
            timestamp_ms: 0,
            category,
            phase,
            protocol,
            payload: payload.as_object().unwrap().clone(),
        }
    }

    #[test]
    fn split_protocol_accumulates_across_phases() {
        let mut call = <ModelCall as ApplyEvent>::new("m1".to_string());

        call.apply(envelope(
            CallCategory::Model,
            Phase::Start,
            Protocol::Split,
            json!({"id": "m1", "model": "gemini-2.5-pro", "status": "started", "startTime": 0}),
        ));
        assert_eq!(call.status, "started");
        assert_eq!(call.start_time_ms, Some(0));
        assert_eq!(call.end_time_ms, None);

        call.apply(envelope(
            CallCategory::Model,
            Phase::End,
            Protocol::Split,
            json!({"id": "m1", "status": "completed", "endTime": 200, "duration": 200, "totalTokens": 50}),
        ));
        assert_eq!(call.status, "completed");
        assert_eq!(call.start_time_ms, Some(0));
        assert_eq!(call.end_time_ms, Some(200));
        assert_eq!(call.duration_ms, Some(200));
        assert_eq!(call.total_tokens, Some(50));
        // Earlier fields survive a payload that omits them
        assert_eq!(call.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(call.events.len(), 2);
    }

    #[test]
    fn fused_terminal_carries_both_instants() {
        let mut call = <ToolCall as ApplyEvent>::new("t1".to_string());
        call.apply(envelope(
            CallCategory::Tool,
            Phase::Completed,
            Protocol::Fused,
            json!({
                "id": "t1", "toolName": "grep",
                "startTime": 1000, "endTime": 1500, "duration": 500,
                "executionDuration": 420, "pureExecutionDuration": 400
            }),
        ));
        assert_eq!(call.status, "completed");
        assert_eq!(call.start_time_ms, Some(1000));
        assert_eq!(call.end_time_ms, Some(1500));
        assert_eq!(call.duration_ms, Some(500));
        assert_eq!(call.execution_duration_ms, Some(420));
        assert_eq!(call.pure_execution_duration_ms, Some(400));
    }

    #[test]
    fn terminal_without_end_time_falls_back_to_payload_start() {
        let mut call = <ToolCall as ApplyEvent>::new("t1".to_string());
        call.apply(envelope(
            CallCategory::Tool,
            Phase::End,
            Protocol::Split,
            json!({"id": "t1", "startTime": 700, "duration": 0}),
        ));
        assert_eq!(call.end_time_ms, Some(700));
    }

    #[test]
    fn status_falls_back_to_phase_name() {
        let mut call = <ToolCall as ApplyEvent>::new("t1".to_string());
        call.apply(envelope(
            CallCategory::Tool,
            Phase::Error,
            Protocol::Split,
            json!({"id": "t1", "error": "exit 1"}),
        ));
        assert_eq!(call.status, "error");
        assert_eq!(call.error.as_deref(), Some("exit 1"));
    }

    #[test]
    fn reapplying_same_event_changes_nothing_but_the_trail() {
        let env = envelope(
            CallCategory::Tool,
            Phase::Completed,
            Protocol::Fused,
            json!({"id": "t1", "toolName": "grep", "startTime": 1, "endTime": 2, "duration": 1}),
        );
        let mut once = <ToolCall as ApplyEvent>::new("t1".to_string());
        once.apply(env.clone());

        let mut twice = <ToolCall as ApplyEvent>::new("t1".to_string());
        twice.apply(env.clone());
        twice.apply(env);

        assert_eq!(once.status, twice.status);
        assert_eq!(once.start_time_ms, twice.start_time_ms);
        assert_eq!(once.end_time_ms, twice.end_time_ms);
        assert_eq!(once.duration_ms, twice.duration_ms);
        assert_eq!(once.tool_name, twice.tool_name);
        assert_eq!(once.events.len(), 1);
        assert_eq!(twice.events.len(), 2);
    }

    #[test]
    fn duplicate_terminal_after_terminal_is_tolerated() {
        let mut call = <ModelCall as ApplyEvent>::new("m1".to_string());
        call.apply(envelope(
            CallCategory::Model,
            Phase::End,
            Protocol::Split,
            json!({"id": "m1", "endTime": 300, "duration": 300}),
        ));
        call.apply(envelope(
            CallCategory::Model,
            Phase::Start,
            Protocol::Split,
            json!({"id": "m1", "startTime": 0}),
        ));
        // Out-of-order start still lands; the end fields are untouched
        assert_eq!(call.start_time_ms, Some(0));
        assert_eq!(call.end_time_ms, Some(300));
        assert_eq!(call.status, "start");
    }

    #[test]
    fn embedding_volumetrics_merge() {
        let mut call = <EmbeddingCall as ApplyEvent>::new("e1".to_string());
        call.apply(envelope(
            CallCategory::Embedding,
            Phase::Completed,
            Protocol::Fused,
            json!({
                "id": "e1", "model": "text-embedding-004",
                "startTime": 10, "endTime": 40, "duration": 30,
                "textCount": 3, "dimensions": 768,
                "texts": ["a", "b", "c"]
            }),
        ));
        assert_eq!(call.text_count, Some(3));
        assert_eq!(call.dimensions, Some(768));
        assert_eq!(call.model.as_deref(), Some("text-embedding-004"));
    }
}
