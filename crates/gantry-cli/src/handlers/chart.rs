use crate::output::gantt;
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(trace: &Path, output: &Path) -> Result<()> {
    let analysis = gantry_engine::analyze_path(trace)
        .with_context(|| format!("failed to read trace file {}", trace.display()))?;
    let segments = gantry_engine::build_timeline(&analysis);

    if segments.is_empty() {
        eprintln!("warning: no timeline-eligible calls in {}", trace.display());
    }

    let source = trace
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| trace.display().to_string());
    let html = gantt::render_html(&source, &segments);
    std::fs::write(output, html)
        .with_context(|| format!("failed to write chart to {}", output.display()))?;

    println!(
        "Chart written to {} ({} segments)",
        output.display(),
        segments.len()
    );
    Ok(())
}
