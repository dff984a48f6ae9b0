use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::registry::Registry;
use gantry_types::{ConfirmationRecord, EventEnvelope, ToolCall};
use std::collections::HashMap;

/// Attaches confirmation events to their parent tool call by foreign key.
///
/// A confirmation can arrive before the runtime has logged anything about
/// its tool call. Those orphans wait in a per-id queue and are delivered
/// when the tool record is first created; if the parent never shows up they
/// stay queued and are reported as unresolved, never dropped.
#[derive(Default)]
pub struct ConfirmationLinker {
    pending: HashMap<String, Vec<ConfirmationRecord>>,
}

impl ConfirmationLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach now if the parent exists, queue otherwise.
    pub fn link(&mut self, record: ConfirmationRecord, tools: &mut Registry<ToolCall>) {
        match tools.get_mut(&record.tool_call_id) {
            Some(tool) => tool.confirmations.push(record),
            None => self
                .pending
                .entry(record.tool_call_id.clone())
                .or_default()
                .push(record),
        }
    }

    /// Deliver queued confirmations to a freshly created tool record.
    pub fn deliver_pending(&mut self, tool: &mut ToolCall) {
        if let Some(queued) = self.pending.remove(&tool.id) {
            tool.confirmations.extend(queued);
        }
    }

    /// Confirmations still waiting for a parent at end of stream.
    pub fn unresolved_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Tool-call ids referenced by unresolved confirmations, sorted for
    /// stable reporting.
    pub fn unresolved_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.pending.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Build a confirmation record out of a `user_confirmation` envelope.
/// Both identity fields are required; an event missing either is dropped.
pub fn confirmation_from_envelope(envelope: &EventEnvelope) -> Result<ConfirmationRecord> {
    let payload = Payload::new(&envelope.payload);
    let id = payload
        .non_empty_str("id")
        .ok_or_else(|| Error::MissingField("id".to_string()))?;
    let tool_call_id = payload
        .non_empty_str("toolCallId")
        .ok_or_else(|| Error::MissingField("toolCallId".to_string()))?;

    Ok(ConfirmationRecord {
        id: id.to_string(),
        tool_call_id: tool_call_id.to_string(),
        confirmation_type: payload
            .non_empty_str("confirmationType")
            .map(|s| s.to_string()),
        timestamp_ms: envelope.timestamp_ms,
        phase: envelope.phase.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_types::{CallCategory, Phase, Protocol};
    use serde_json::json;

    fn confirmation(id: &str, tool_call_id: &str) -> ConfirmationRecord {
        ConfirmationRecord {
            id: id.to_string(),
            tool_call_id: tool_call_id.to_string(),
            confirmation_type: None,
            timestamp_ms: 0,
            phase: Phase::ApprovalRequested,
        }
    }

    fn tool_envelope(id: &str) -> EventEnvelope {
        EventEnvelope {
            timestamp_ms: 0,
            category: CallCategory::Tool,
            phase: Phase::Start,
            protocol: Protocol::Split,
            payload: json!({"id": id}).as_object().unwrap().clone(),
        }
    }

    #[test]
    fn links_directly_when_parent_exists() {
        let mut tools: Registry<ToolCall> = Registry::new();
        tools.ingest(tool_envelope("t1")).unwrap();

        let mut linker = ConfirmationLinker::new();
        linker.link(confirmation("c1", "t1"), &mut tools);

        assert_eq!(tools.get("t1").unwrap().confirmations.len(), 1);
        assert_eq!(linker.unresolved_count(), 0);
    }

    #[test]
    fn orphan_waits_for_late_parent() {
        let mut tools: Registry<ToolCall> = Registry::new();
        let mut linker = ConfirmationLinker::new();

        linker.link(confirmation("c1", "t9"), &mut tools);
        assert_eq!(linker.unresolved_count(), 1);

        tools.ingest(tool_envelope("t9")).unwrap();
        let tool = tools.get_mut("t9").unwrap();
        linker.deliver_pending(tool);

        assert_eq!(tool.confirmations.len(), 1);
        assert_eq!(tool.confirmations[0].id, "c1");
        assert_eq!(linker.unresolved_count(), 0);
    }

    #[test]
    fn unresolved_ids_are_sorted_and_kept() {
        let mut tools: Registry<ToolCall> = Registry::new();
        let mut linker = ConfirmationLinker::new();
        linker.link(confirmation("c2", "t9"), &mut tools);
        linker.link(confirmation("c1", "t3"), &mut tools);
        linker.link(confirmation("c3", "t9"), &mut tools);

        assert_eq!(linker.unresolved_count(), 3);
        assert_eq!(linker.unresolved_ids(), vec!["t3", "t9"]);
    }

    #[test]
    fn envelope_without_foreign_key_is_rejected() {
        let envelope = EventEnvelope {
            timestamp_ms: 0,
            category: CallCategory::Confirmation,
            phase: Phase::ApprovalRequested,
            protocol: Protocol::Split,
            payload: json!({"id": "c1"}).as_object().unwrap().clone(),
        };
        assert!(matches!(
            confirmation_from_envelope(&envelope),
            Err(Error::MissingField(_))
        ));
    }

    #[test]
    fn insertion_order_is_preserved_across_queue_and_direct() {
        let mut tools: Registry<ToolCall> = Registry::new();
        let mut linker = ConfirmationLinker::new();

        linker.link(confirmation("c1", "t1"), &mut tools);
        linker.link(confirmation("c2", "t1"), &mut tools);
        tools.ingest(tool_envelope("t1")).unwrap();
        linker.deliver_pending(tools.get_mut("t1").unwrap());
        linker.link(confirmation("c3", "t1"), &mut tools);

        let ids: Vec<&str> = tools
            .get("t1")
            .unwrap()
            .confirmations
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }
}
