// Engine layer - event correlation and timeline reconstruction
// Sits between raw JSONL trace lines and CLI presentation

pub mod aggregate;
pub mod confirm;
pub mod consistency;
pub mod decode;
mod error;
pub mod extract;
pub mod fusion;
mod merge;
mod payload;
pub mod preview;
pub mod registry;
pub mod timeline;
mod trace;

pub use error::{Error, Result};
pub use registry::{ApplyEvent, IngestOutcome, Registry};
pub use trace::{LineDiagnostic, TraceAnalysis};

use gantry_types::{Anomaly, Segment, TraceStats};
use std::io::BufRead;
use std::path::Path;

// Façade API - stable public interface for the CLI layer

/// Reconstruct call records from a trace file.
pub fn analyze_path(path: &Path) -> Result<TraceAnalysis> {
    TraceAnalysis::from_path(path)
}

/// Reconstruct call records from any line-oriented reader.
pub fn analyze_reader<R: BufRead>(reader: R) -> Result<TraceAnalysis> {
    TraceAnalysis::from_reader(reader)
}

/// Ordered segments for the rendering layer.
pub fn build_timeline(analysis: &TraceAnalysis) -> Vec<Segment> {
    timeline::build_timeline(analysis)
}

/// Summary statistics over the reconstructed registries.
pub fn summarize(analysis: &TraceAnalysis) -> TraceStats {
    aggregate::summarize(analysis)
}

/// Advisory sub-call under-reporting check.
pub fn check_consistency(analysis: &TraceAnalysis) -> Option<Anomaly> {
    consistency::check(analysis)
}

/// Split-to-fused conversion projection for this trace.
pub fn fusion_report(analysis: &TraceAnalysis) -> fusion::FusionReport {
    fusion::project(&analysis.fusion)
}
