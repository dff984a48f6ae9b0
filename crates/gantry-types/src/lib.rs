// Types layer - shared data model for the engine and CLI
// No parsing or merge logic lives here; the engine owns behavior

mod call;
mod event;
mod segment;
mod stats;
pub mod util;

pub use call::{ConfirmationRecord, EmbeddingCall, ModelCall, ToolCall};
pub use event::{CallCategory, EventEnvelope, Phase, Protocol};
pub use segment::{Segment, SegmentMeta};
pub use stats::{
    Anomaly, ApprovalSummary, CategoryStats, EmbeddingStats, LatencySummary, ModelStats,
    ToolStats, TraceStats,
};
