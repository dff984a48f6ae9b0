use crate::types::OutputFormat;
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(trace: &Path, format: OutputFormat) -> Result<()> {
    let analysis = gantry_engine::analyze_path(trace)
        .with_context(|| format!("failed to read trace file {}", trace.display()))?;
    let report = gantry_engine::fusion_report(&analysis);

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Fusion projection for {}", trace.display());
    println!("\nCurrent trace:");
    println!("  events:           {}", report.total_events);
    println!("  size:             {} bytes", report.total_bytes);
    println!("  unique calls:     {}", report.unique_calls);
    println!("  duplicated data:  ~{} bytes", report.duplicated_bytes);
    if !report.events_by_kind.is_empty() {
        println!("\n  event kinds:");
        for (kind, count) in &report.events_by_kind {
            println!("    {:<40} {}", kind, count);
        }
    }

    println!("\nProjected fused trace:");
    println!("  events:           {}", report.projected_events);
    println!("  size:             ~{} bytes", report.projected_bytes);
    if !report.projected_events_by_kind.is_empty() {
        println!("\n  event kinds:");
        for (kind, count) in &report.projected_events_by_kind {
            println!("    {:<40} {}", kind, count);
        }
    }

    println!(
        "\nSavings: {} events ({:.1}%), {} bytes ({:.1}%)",
        report.events_saved,
        report.events_saved_pct,
        report.bytes_saved,
        report.bytes_saved_pct
    );
    Ok(())
}
