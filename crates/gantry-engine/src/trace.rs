use crate::confirm::{ConfirmationLinker, confirmation_from_envelope};
use crate::decode::decode_line;
use crate::error::Result;
use crate::fusion::FusionCounters;
use crate::registry::Registry;
use gantry_types::{CallCategory, EmbeddingCall, EventEnvelope, ModelCall, ToolCall};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;

/// One skipped line or dropped event, with enough context to find it in
/// the source file.
#[derive(Debug, Clone, Serialize)]
pub struct LineDiagnostic {
    pub line: usize,
    pub reason: String,
}

/// In-memory reconstruction of one trace file.
///
/// Owns the three category registries, the confirmation linker, per-line
/// diagnostics, and the fusion counters. Built in a single pass over the
/// stream in log order. Field overwrites depend on apply order, so two
/// updates to the same id must never be applied concurrently. Lives
/// exactly as long as one analysis run.
pub struct TraceAnalysis {
    pub models: Registry<ModelCall>,
    pub tools: Registry<ToolCall>,
    pub embeddings: Registry<EmbeddingCall>,
    pub linker: ConfirmationLinker,
    /// Envelopes decoded successfully, including dropped and confirmation
    /// events.
    pub events_seen: usize,
    /// Lines that failed to decode; the stream continues past them.
    pub decode_failures: Vec<LineDiagnostic>,
    /// Decoded events dropped for a missing identity field.
    pub dropped_events: Vec<LineDiagnostic>,
    pub fusion: FusionCounters,
}

impl TraceAnalysis {
    pub fn new() -> Self {
        Self {
            models: Registry::new(),
            tools: Registry::new(),
            embeddings: Registry::new(),
            linker: ConfirmationLinker::new(),
            events_seen: 0,
            decode_failures: Vec::new(),
            dropped_events: Vec::new(),
            fusion: FusionCounters::default(),
        }
    }

    /// Read a whole trace file. Only failure to open or read the file is
    /// fatal; per-line problems become diagnostics.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut analysis = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            analysis.ingest_line(index + 1, &line);
        }
        Ok(analysis)
    }

    /// Process one line of the stream. Blank lines are skipped silently;
    /// undecodable lines and id-less events are recorded and skipped.
    /// Never fails: tolerance is the contract.
    pub fn ingest_line(&mut self, line_number: usize, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        match decode_line(trimmed) {
            Ok(envelope) => {
                self.events_seen += 1;
                self.fusion.observe(&envelope, trimmed.len());
                if let Err(err) = self.apply(envelope) {
                    self.dropped_events.push(LineDiagnostic {
                        line: line_number,
                        reason: err.to_string(),
                    });
                }
            }
            Err(err) => self.decode_failures.push(LineDiagnostic {
                line: line_number,
                reason: err.to_string(),
            }),
        }
    }

    fn apply(&mut self, envelope: EventEnvelope) -> Result<()> {
        match envelope.category {
            CallCategory::Model => {
                self.models.ingest(envelope)?;
            }
            CallCategory::Tool => {
                let outcome = self.tools.ingest(envelope)?;
                if outcome.created
                    && let Some(tool) = self.tools.get_mut(&outcome.id)
                {
                    self.linker.deliver_pending(tool);
                }
            }
            CallCategory::Embedding => {
                self.embeddings.ingest(envelope)?;
            }
            CallCategory::Confirmation => {
                let record = confirmation_from_envelope(&envelope)?;
                self.linker.link(record, &mut self.tools);
            }
        }
        Ok(())
    }

}

impl Default for TraceAnalysis {
    fn default() -> Self {
        Self::new()
    }
}
