use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics over one trace, as produced by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStats {
    /// Every decoded envelope, including confirmations and dropped-id events.
    pub events_seen: usize,
    /// Lines that failed to decode and were skipped.
    pub decode_failures: usize,
    /// Confirmations whose parent tool call never appeared.
    pub unresolved_confirmations: usize,
    pub model: ModelStats,
    pub tool: ToolStats,
    pub embedding: EmbeddingStats,
}

/// Shared per-category counters.
///
/// `total` counts every record ever created for the category, including
/// dangling ones; only records with a reported duration contribute to
/// `latency`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStats {
    pub total: usize,
    pub completed: usize,
    pub errors: usize,
    pub cancelled: usize,
    /// Records that never saw a terminal phase.
    pub dangling: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencySummary>,
}

/// Min/max/mean over a set of reported durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: usize,
    pub min_ms: i64,
    pub max_ms: i64,
    pub mean_ms: f64,
}

impl LatencySummary {
    /// Returns `None` for an empty sample.
    pub fn from_samples(samples: &[i64]) -> Option<Self> {
        let first = *samples.first()?;
        let mut min = first;
        let mut max = first;
        let mut sum: i64 = 0;
        for &sample in samples {
            min = min.min(sample);
            max = max.max(sample);
            sum += sample;
        }
        Some(Self {
            count: samples.len(),
            min_ms: min,
            max_ms: max,
            mean_ms: sum as f64 / samples.len() as f64,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStats {
    pub calls: CategoryStats,
    pub total_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_tokens: Option<f64>,
    pub calls_by_model: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolStats {
    pub calls: CategoryStats,
    pub calls_by_tool: BTreeMap<String, usize>,
    /// Present only when at least one call reported a positive approval
    /// wait. Calls without the field did not require approval and are not
    /// counted as zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalSummary>,
    pub approval_by_tool: BTreeMap<String, LatencySummary>,
    /// Execution-time distribution, preferring the pure-execution figure
    /// over the broader one when a call reports both.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<LatencySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalSummary {
    pub count: usize,
    pub min_ms: i64,
    pub max_ms: i64,
    pub mean_ms: f64,
    pub total_ms: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingStats {
    pub calls: CategoryStats,
    pub total_texts: u64,
    /// Distinct vector dimensionalities observed, ascending.
    pub dimensions: Vec<u64>,
}

/// Advisory under-reporting signal from the consistency checker.
///
/// `expected` is inferred from response-text heuristics and may overcount;
/// this is a lead to investigate, not a verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// Function-call mentions found in completed model responses.
    pub expected: usize,
    /// Tool-call records observed in the same trace.
    pub observed: usize,
    pub possible_causes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_summary_from_samples() {
        let summary = LatencySummary::from_samples(&[500, 100, 300]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min_ms, 100);
        assert_eq!(summary.max_ms, 500);
        assert_eq!(summary.mean_ms, 300.0);
    }

    #[test]
    fn latency_summary_empty() {
        assert!(LatencySummary::from_samples(&[]).is_none());
    }
}
