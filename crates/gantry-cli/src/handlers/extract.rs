use anyhow::{Context, Result};
use gantry_engine::extract::{extract_records, project_fields, summarize_records};
use std::io::BufReader;
use std::path::Path;

pub fn handle(trace: &Path, output: &Path, data_only: bool, fields: &[String]) -> Result<()> {
    let file = std::fs::File::open(trace)
        .with_context(|| format!("failed to read trace file {}", trace.display()))?;
    let (records, failures) = extract_records(BufReader::new(file))?;

    for failure in &failures {
        eprintln!("warning: line {}: {}", failure.line, failure.reason);
    }

    let summary = summarize_records(&records);
    println!("Parsed {} records from {}", summary.total_records, trace.display());
    if !summary.event_kinds.is_empty() {
        println!("\nEvent kinds:");
        for (kind, count) in &summary.event_kinds {
            println!("  {:<40} {}", kind, count);
        }
    }
    if !summary.data_keys.is_empty() {
        println!("\nData keys:");
        for (key, count) in &summary.data_keys {
            println!("  {:<40} in {} records", key, count);
        }
    }

    let json = if !fields.is_empty() {
        serde_json::to_string_pretty(&project_fields(&records, fields))?
    } else if data_only {
        let data: Vec<&serde_json::Value> = records.iter().map(|r| &r.data).collect();
        serde_json::to_string_pretty(&data)?
    } else {
        serde_json::to_string_pretty(&records)?
    };
    std::fs::write(output, json)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("\nSaved to {}", output.display());
    Ok(())
}
