use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which kind of runtime call an event belongs to.
///
/// Correlation ids are namespaced per category: the same id string may
/// appear in two categories and refers to two unrelated calls.
///
/// The declaration order defines the tie-break order used by the timeline
/// builder (Model before Tool before Embedding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallCategory {
    Model,
    Tool,
    Embedding,
    Confirmation,
}

impl CallCategory {
    /// Wire name used in the `type` field of a log line.
    pub fn wire_name(&self) -> &'static str {
        match self {
            CallCategory::Model => "llm_call",
            CallCategory::Tool => "tool_call",
            CallCategory::Embedding => "embedding_call",
            CallCategory::Confirmation => "user_confirmation",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "llm_call" => Some(CallCategory::Model),
            "tool_call" => Some(CallCategory::Tool),
            "embedding_call" => Some(CallCategory::Embedding),
            "user_confirmation" => Some(CallCategory::Confirmation),
            _ => None,
        }
    }

    /// Human label for summaries ("LLM", "Tool", ...).
    pub fn label(&self) -> &'static str {
        match self {
            CallCategory::Model => "LLM",
            CallCategory::Tool => "Tool",
            CallCategory::Embedding => "Embedding",
            CallCategory::Confirmation => "Confirmation",
        }
    }
}

/// Lifecycle stage carried by the `event` field of a log line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Start,
    End,
    Completed,
    Error,
    Cancelled,
    ApprovalRequested,
    ApprovalGranted,
    ApprovalDenied,
    Other(String),
}

impl Phase {
    pub fn from_wire(name: &str) -> Self {
        match name {
            "start" => Phase::Start,
            "end" => Phase::End,
            "completed" => Phase::Completed,
            "error" => Phase::Error,
            "cancelled" => Phase::Cancelled,
            "approval_requested" => Phase::ApprovalRequested,
            "approval_granted" => Phase::ApprovalGranted,
            "approval_denied" => Phase::ApprovalDenied,
            other => Phase::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Phase::Start => "start",
            Phase::End => "end",
            Phase::Completed => "completed",
            Phase::Error => "error",
            Phase::Cancelled => "cancelled",
            Phase::ApprovalRequested => "approval_requested",
            Phase::ApprovalGranted => "approval_granted",
            Phase::ApprovalDenied => "approval_denied",
            Phase::Other(name) => name,
        }
    }

    /// Phases that close a call's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Phase::End | Phase::Completed | Phase::Error | Phase::Cancelled
        )
    }
}

/// Which logging protocol produced an event.
///
/// Split traces emit a `start` event and a later `end`/`error` event per
/// call; fused traces emit one `completed`/`error`/`cancelled` event
/// carrying both instants. Detection happens once, at the decoder boundary,
/// and is recorded on the envelope so downstream code never re-derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Split,
    Fused,
}

/// One decoded log line. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event instant, epoch milliseconds.
    pub timestamp_ms: i64,
    pub category: CallCategory,
    pub phase: Phase,
    pub protocol: Protocol,
    /// Raw `data` object of the line. Field semantics are category-specific
    /// and interpreted by the registries, not here.
    pub payload: Map<String, Value>,
}
