use crate::event::CallCategory;
use serde::{Deserialize, Serialize};

/// A timeline-eligible call rendered as one interval.
///
/// Segments are ordered by `start_ms` ascending, ties broken by
/// (category, id). `rank` is the position in that order, assigned after
/// sorting; it is purely presentational and must not be used as an
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub rank: usize,
    pub label: String,
    pub category: CallCategory,
    pub id: String,
    pub start_ms: i64,
    /// May be earlier than `start_ms` on skewed input; emitted unmodified.
    /// Flooring to a visible width is the renderer's job.
    pub end_ms: i64,
    /// Duration as reported by the terminal event, not `end - start`.
    pub duration_reported_ms: Option<i64>,
    pub status: String,
    pub meta: SegmentMeta,
}

/// Display-only extras attached to a segment. Never consulted by the
/// engine's own logic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_wait_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
