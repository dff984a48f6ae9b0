use chrono::DateTime;
use gantry_engine::TraceAnalysis;
use gantry_types::util::{format_duration_ms, truncate};
use gantry_types::{Anomaly, CategoryStats, TraceStats};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn print_summary(
    trace: &Path,
    analysis: &TraceAnalysis,
    stats: &TraceStats,
    anomaly: Option<&Anomaly>,
    enable_color: bool,
) {
    println!("{}", heading(&format!("Trace summary: {}", trace.display()), enable_color));
    println!(
        "  events: {} decoded, {} lines skipped, {} dropped",
        stats.events_seen,
        stats.decode_failures,
        analysis.dropped_events.len()
    );

    print_category_block("LLM calls", &stats.model.calls, enable_color);
    if stats.model.total_tokens > 0 {
        let mean = stats
            .model
            .mean_tokens
            .map(|m| format!(", {:.0} avg", m))
            .unwrap_or_default();
        println!("  tokens: {} total{}", stats.model.total_tokens, mean);
    }
    print_count_table("by model", &stats.model.calls_by_model);

    print_category_block("Tool calls", &stats.tool.calls, enable_color);
    if let Some(execution) = &stats.tool.execution {
        println!(
            "  execution: min {} / mean {} / max {}",
            format_duration_ms(execution.min_ms),
            format_duration_ms(execution.mean_ms as i64),
            format_duration_ms(execution.max_ms)
        );
    }
    print_count_table("by tool", &stats.tool.calls_by_tool);

    if let Some(approval) = &stats.tool.approval {
        println!("\n{}", heading("Approval waits", enable_color));
        println!(
            "  {} calls needed approval: mean {} / min {} / max {} / total {}",
            approval.count,
            format_duration_ms(approval.mean_ms as i64),
            format_duration_ms(approval.min_ms),
            format_duration_ms(approval.max_ms),
            format_duration_ms(approval.total_ms)
        );
        for (tool, waits) in &stats.tool.approval_by_tool {
            println!(
                "    {:<30} mean {} ({} calls)",
                tool,
                format_duration_ms(waits.mean_ms as i64),
                waits.count
            );
        }
    }

    if stats.embedding.calls.total > 0 {
        print_category_block("Embedding calls", &stats.embedding.calls, enable_color);
        let dims = if stats.embedding.dimensions.is_empty() {
            "unknown".to_string()
        } else {
            stats
                .embedding
                .dimensions
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "  texts: {} total, dimensions: {}",
            stats.embedding.total_texts, dims
        );
    }

    print_tool_results(analysis, enable_color);

    if stats.unresolved_confirmations > 0 {
        let ids = analysis.linker.unresolved_ids().join(", ");
        let line = format!(
            "Unresolved confirmations: {} (tool ids: {})",
            stats.unresolved_confirmations, ids
        );
        println!("\n{}", warn(&line, enable_color));
    }

    if let Some(anomaly) = anomaly {
        print_anomaly(anomaly, enable_color);
    }

    print_recent_events(analysis, enable_color);
}

fn print_category_block(label: &str, calls: &CategoryStats, enable_color: bool) {
    println!("\n{}", heading(label, enable_color));
    let errors = if calls.errors > 0 && enable_color {
        format!("{}", calls.errors.red())
    } else {
        calls.errors.to_string()
    };
    println!(
        "  total {} | completed {} | errors {} | cancelled {} | in-flight {}",
        calls.total, calls.completed, errors, calls.cancelled, calls.dangling
    );
    if let Some(latency) = &calls.latency {
        println!(
            "  latency: min {} / mean {} / max {} ({} samples)",
            format_duration_ms(latency.min_ms),
            format_duration_ms(latency.mean_ms as i64),
            format_duration_ms(latency.max_ms),
            latency.count
        );
    }
}

fn print_count_table(label: &str, counts: &std::collections::BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    println!("  {}:", label);
    for (name, count) in counts {
        println!("    {:<30} {}", name, count);
    }
}

/// Result previews for the first few finished tool calls, the quickest way
/// to see what a trace actually did.
fn print_tool_results(analysis: &TraceAnalysis, enable_color: bool) {
    let finished: Vec<_> = analysis
        .tools
        .iter()
        .filter(|t| t.result.is_some() || t.result_display.is_some())
        .collect();
    if finished.is_empty() {
        return;
    }

    println!("\n{}", heading("Tool results", enable_color));
    for tool in finished.iter().take(5) {
        let name = tool.tool_name.as_deref().unwrap_or("unknown");
        let duration = tool
            .duration_ms
            .map(format_duration_ms)
            .unwrap_or_else(|| "-".to_string());
        let mut timing = duration.clone();
        if let Some(wait) = tool.awaiting_approval_duration_ms.filter(|&ms| ms > 0) {
            let execution = tool
                .pure_execution_duration_ms
                .or(tool.execution_duration_ms)
                .map(format_duration_ms)
                .unwrap_or_else(|| "-".to_string());
            timing = format!(
                "{} (execution {}, approval wait {})",
                duration,
                execution,
                format_duration_ms(wait)
            );
        }
        println!("  {} ({})", name, timing);

        if let Some(display) = &tool.result_display {
            println!("    {}", truncate(display, 200));
        }
        if let Some(result) = &tool.result
            && tool.result_display.as_deref() != Some(result.as_str())
        {
            println!("    {}", truncate(result, 300));
        }
    }
    if finished.len() > 5 {
        println!("  ... {} more", finished.len() - 5);
    }
}

fn print_anomaly(anomaly: &Anomaly, enable_color: bool) {
    let line = format!(
        "Possible under-reporting: model responses mention {} function calls, {} tool calls recorded",
        anomaly.expected, anomaly.observed
    );
    println!("\n{}", warn(&line, enable_color));
    for cause in &anomaly.possible_causes {
        println!("  - {}", cause);
    }
    println!("  (best-effort heuristic; false positives are possible)");
}

/// The last few events across every registry, in timestamp order.
fn print_recent_events(analysis: &TraceAnalysis, enable_color: bool) {
    let mut events: Vec<(i64, String)> = Vec::new();

    for call in analysis.models.iter() {
        let name = call.model.as_deref().unwrap_or("unknown");
        for envelope in &call.events {
            events.push((
                envelope.timestamp_ms,
                format!("LLM {} ({})", envelope.phase.name(), name),
            ));
        }
    }
    for call in analysis.tools.iter() {
        let name = call.tool_name.as_deref().unwrap_or("unknown");
        for envelope in &call.events {
            events.push((
                envelope.timestamp_ms,
                format!("Tool {} ({})", envelope.phase.name(), name),
            ));
        }
    }
    for call in analysis.embeddings.iter() {
        let name = call.model.as_deref().unwrap_or("unknown");
        for envelope in &call.events {
            events.push((
                envelope.timestamp_ms,
                format!("Embedding {} ({})", envelope.phase.name(), name),
            ));
        }
    }

    if events.is_empty() {
        return;
    }
    events.sort_by_key(|(ts, _)| *ts);

    println!("\n{}", heading("Recent events", enable_color));
    let tail = events.len().saturating_sub(5);
    for (timestamp_ms, description) in &events[tail..] {
        println!("  {}  {}", format_clock(*timestamp_ms), description);
    }
}

fn format_clock(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

fn heading(text: &str, enable_color: bool) -> String {
    if enable_color {
        format!("{}", text.bold())
    } else {
        text.to_string()
    }
}

fn warn(text: &str, enable_color: bool) -> String {
    if enable_color {
        format!("{}", text.yellow())
    } else {
        text.to_string()
    }
}
