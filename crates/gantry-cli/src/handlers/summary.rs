use crate::output::console;
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct SummaryReport<'a> {
    trace: String,
    stats: gantry_types::TraceStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    anomaly: Option<gantry_types::Anomaly>,
    unresolved_tool_ids: Vec<&'a str>,
}

pub fn handle(trace: &Path, format: OutputFormat, enable_color: bool) -> Result<()> {
    let analysis = gantry_engine::analyze_path(trace)
        .with_context(|| format!("failed to read trace file {}", trace.display()))?;
    let stats = gantry_engine::summarize(&analysis);
    let anomaly = gantry_engine::check_consistency(&analysis);

    match format {
        OutputFormat::Json => {
            let report = SummaryReport {
                trace: trace.display().to_string(),
                stats,
                anomaly,
                unresolved_tool_ids: analysis.linker.unresolved_ids(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            console::print_summary(trace, &analysis, &stats, anomaly.as_ref(), enable_color);
        }
    }
    Ok(())
}
