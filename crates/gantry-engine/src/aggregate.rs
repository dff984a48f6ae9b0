use crate::trace::TraceAnalysis;
use gantry_types::{
    ApprovalSummary, CategoryStats, EmbeddingStats, LatencySummary, ModelStats, Phase, ToolStats,
    TraceStats,
};
use std::collections::{BTreeMap, BTreeSet};

/// Compute summary statistics over the reconstructed registries.
///
/// Latency distributions use only durations reported by terminal events;
/// a record with both instants but no reported duration contributes to
/// totals, not to latency. The tool execution summary prefers
/// `pureExecutionDuration` and falls back to `executionDuration` when a
/// call reports only the broader figure.
pub fn summarize(analysis: &TraceAnalysis) -> TraceStats {
    TraceStats {
        events_seen: analysis.events_seen,
        decode_failures: analysis.decode_failures.len(),
        unresolved_confirmations: analysis.linker.unresolved_count(),
        model: model_stats(analysis),
        tool: tool_stats(analysis),
        embedding: embedding_stats(analysis),
    }
}

fn classify(calls: &mut CategoryStats, last_phase: &Phase) {
    match last_phase {
        Phase::End | Phase::Completed => calls.completed += 1,
        Phase::Error => calls.errors += 1,
        Phase::Cancelled => calls.cancelled += 1,
        _ => calls.dangling += 1,
    }
}

fn model_stats(analysis: &TraceAnalysis) -> ModelStats {
    let mut stats = ModelStats::default();
    let mut durations = Vec::new();
    let mut token_samples = 0usize;

    for call in analysis.models.iter() {
        stats.calls.total += 1;
        classify(&mut stats.calls, &call.last_phase);

        if let Some(duration) = call.duration_ms {
            durations.push(duration);
        }
        if let Some(tokens) = call.total_tokens {
            stats.total_tokens += tokens;
            token_samples += 1;
        }
        let model = call.model.as_deref().unwrap_or("unknown").to_string();
        *stats.calls_by_model.entry(model).or_insert(0) += 1;
    }

    stats.calls.latency = LatencySummary::from_samples(&durations);
    if token_samples > 0 {
        stats.mean_tokens = Some(stats.total_tokens as f64 / token_samples as f64);
    }
    stats
}

fn tool_stats(analysis: &TraceAnalysis) -> ToolStats {
    let mut stats = ToolStats::default();
    let mut durations = Vec::new();
    let mut executions = Vec::new();
    let mut approvals = Vec::new();
    let mut approvals_by_tool: BTreeMap<String, Vec<i64>> = BTreeMap::new();

    for call in analysis.tools.iter() {
        stats.calls.total += 1;
        classify(&mut stats.calls, &call.last_phase);

        if let Some(duration) = call.duration_ms {
            durations.push(duration);
        }
        if let Some(execution) = call
            .pure_execution_duration_ms
            .or(call.execution_duration_ms)
        {
            executions.push(execution);
        }

        let name = call.tool_name.as_deref().unwrap_or("unknown").to_string();
        *stats.calls_by_tool.entry(name.clone()).or_insert(0) += 1;

        // A missing approval field means no approval was needed; only a
        // positive wait enters the distribution.
        if let Some(wait) = call.awaiting_approval_duration_ms.filter(|&ms| ms > 0) {
            approvals.push(wait);
            approvals_by_tool.entry(name).or_default().push(wait);
        }
    }

    stats.calls.latency = LatencySummary::from_samples(&durations);
    stats.execution = LatencySummary::from_samples(&executions);
    stats.approval = approval_summary(&approvals);
    for (tool, waits) in approvals_by_tool {
        if let Some(summary) = LatencySummary::from_samples(&waits) {
            stats.approval_by_tool.insert(tool, summary);
        }
    }
    stats
}

fn approval_summary(waits: &[i64]) -> Option<ApprovalSummary> {
    let latency = LatencySummary::from_samples(waits)?;
    Some(ApprovalSummary {
        count: latency.count,
        min_ms: latency.min_ms,
        max_ms: latency.max_ms,
        mean_ms: latency.mean_ms,
        total_ms: waits.iter().sum(),
    })
}

fn embedding_stats(analysis: &TraceAnalysis) -> EmbeddingStats {
    let mut stats = EmbeddingStats::default();
    let mut durations = Vec::new();
    let mut dimensions = BTreeSet::new();

    for call in analysis.embeddings.iter() {
        stats.calls.total += 1;
        classify(&mut stats.calls, &call.last_phase);

        if let Some(duration) = call.duration_ms {
            durations.push(duration);
        }
        if let Some(count) = call.text_count {
            stats.total_texts += count;
        }
        if let Some(dims) = call.dimensions {
            dimensions.insert(dims);
        }
    }

    stats.calls.latency = LatencySummary::from_samples(&durations);
    stats.dimensions = dimensions.into_iter().collect();
    stats
}
