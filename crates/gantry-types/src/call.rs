use crate::event::{EventEnvelope, Phase};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Model invocation record, accumulated across its lifecycle events.
///
/// All optional fields default to `None` and are only ever overwritten by a
/// payload that actually carries them; an event that omits a field never
/// clears a previously merged value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCall {
    pub id: String,
    /// Last-observed status string (payload `status` when present, else the
    /// phase name of the most recently merged event).
    pub status: String,
    pub last_phase: Phase,
    pub start_time_ms: Option<i64>,
    pub end_time_ms: Option<i64>,
    /// Duration as reported by the terminal event. Authoritative; latency
    /// aggregates never fall back to subtracting instants.
    pub duration_ms: Option<i64>,
    pub model: Option<String>,
    pub prompt_id: Option<String>,
    pub total_tokens: Option<u64>,
    /// Raw request payload as logged (string or already-parsed JSON).
    pub request_text: Option<Value>,
    /// Raw response payload as logged.
    pub response_text: Option<Value>,
    pub error: Option<String>,
    /// Full audit trail: every envelope merged into this record, in log
    /// order, whether or not it changed a field.
    pub events: Vec<EventEnvelope>,
}

impl ModelCall {
    pub fn new(id: String) -> Self {
        Self {
            id,
            status: String::new(),
            last_phase: Phase::Other(String::new()),
            start_time_ms: None,
            end_time_ms: None,
            duration_ms: None,
            model: None,
            prompt_id: None,
            total_tokens: None,
            request_text: None,
            response_text: None,
            error: None,
            events: Vec::new(),
        }
    }
}

/// Tool invocation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub status: String,
    pub last_phase: Phase,
    pub start_time_ms: Option<i64>,
    pub end_time_ms: Option<i64>,
    pub duration_ms: Option<i64>,
    pub tool_name: Option<String>,
    pub call_id: Option<String>,
    pub prompt_id: Option<String>,
    pub args: Option<Value>,
    /// Execution sub-interval, when the runtime reports one.
    pub execution_start_time_ms: Option<i64>,
    pub execution_end_time_ms: Option<i64>,
    /// Both execution-duration variants seen in the wild are kept; the
    /// aggregator documents which one it prefers.
    pub execution_duration_ms: Option<i64>,
    pub pure_execution_duration_ms: Option<i64>,
    /// Time spent waiting for user approval. Absent means the call never
    /// required approval, which is different from a zero wait.
    pub awaiting_approval_duration_ms: Option<i64>,
    pub result: Option<String>,
    pub result_display: Option<String>,
    pub error: Option<String>,
    pub events: Vec<EventEnvelope>,
    /// Confirmations linked by foreign key, in arrival order.
    pub confirmations: Vec<ConfirmationRecord>,
}

impl ToolCall {
    pub fn new(id: String) -> Self {
        Self {
            id,
            status: String::new(),
            last_phase: Phase::Other(String::new()),
            start_time_ms: None,
            end_time_ms: None,
            duration_ms: None,
            tool_name: None,
            call_id: None,
            prompt_id: None,
            args: None,
            execution_start_time_ms: None,
            execution_end_time_ms: None,
            execution_duration_ms: None,
            pure_execution_duration_ms: None,
            awaiting_approval_duration_ms: None,
            result: None,
            result_display: None,
            error: None,
            events: Vec::new(),
            confirmations: Vec::new(),
        }
    }
}

/// Embedding invocation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingCall {
    pub id: String,
    pub status: String,
    pub last_phase: Phase,
    pub start_time_ms: Option<i64>,
    pub end_time_ms: Option<i64>,
    pub duration_ms: Option<i64>,
    pub model: Option<String>,
    pub text_count: Option<u64>,
    pub dimensions: Option<u64>,
    pub texts: Option<Value>,
    pub error: Option<String>,
    pub events: Vec<EventEnvelope>,
}

impl EmbeddingCall {
    pub fn new(id: String) -> Self {
        Self {
            id,
            status: String::new(),
            last_phase: Phase::Other(String::new()),
            start_time_ms: None,
            end_time_ms: None,
            duration_ms: None,
            model: None,
            text_count: None,
            dimensions: None,
            texts: None,
            error: None,
            events: Vec::new(),
        }
    }
}

/// A user-approval event, owned by exactly one tool call once linked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationRecord {
    pub id: String,
    /// Foreign key into the tool registry.
    pub tool_call_id: String,
    pub confirmation_type: Option<String>,
    pub timestamp_ms: i64,
    pub phase: Phase,
}
