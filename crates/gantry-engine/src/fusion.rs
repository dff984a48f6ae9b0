//! Split-to-fused conversion projection.
//!
//! Estimates what a trace would look like if the runtime logged one fused
//! terminal event per call instead of split start/end pairs: start events
//! disappear, end events become completed events, error and confirmation
//! events are unchanged. Advisory reporting only; nothing else consumes
//! this.

use crate::payload::Payload;
use gantry_types::{CallCategory, EventEnvelope};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Counters fed during ingest, one observation per decoded envelope.
#[derive(Debug, Default)]
pub struct FusionCounters {
    pub total_events: usize,
    pub total_bytes: usize,
    /// Events per `type:event` kind, e.g. `llm_call:start`.
    pub events_by_kind: BTreeMap<String, usize>,
    pub unique_calls: usize,
    /// Payload bytes of every repeat event for an already-seen id; the
    /// split protocol's duplication estimate.
    pub duplicated_bytes: usize,
    seen_ids: HashSet<(CallCategory, String)>,
}

impl FusionCounters {
    pub fn observe(&mut self, envelope: &EventEnvelope, raw_len: usize) {
        self.total_events += 1;
        self.total_bytes += raw_len;

        let kind = format!(
            "{}:{}",
            envelope.category.wire_name(),
            envelope.phase.name()
        );
        *self.events_by_kind.entry(kind).or_insert(0) += 1;

        if let Some(id) = Payload::new(&envelope.payload).non_empty_str("id") {
            let key = (envelope.category, id.to_string());
            if self.seen_ids.contains(&key) {
                self.duplicated_bytes +=
                    serde_json::to_string(&envelope.payload).map_or(0, |s| s.len());
            } else {
                self.seen_ids.insert(key);
                self.unique_calls += 1;
            }
        }
    }
}

/// The projected effect of converting this trace to the fused protocol.
#[derive(Debug, Serialize)]
pub struct FusionReport {
    pub total_events: usize,
    pub total_bytes: usize,
    pub unique_calls: usize,
    pub duplicated_bytes: usize,
    pub events_by_kind: BTreeMap<String, usize>,
    pub projected_events: usize,
    pub projected_bytes: usize,
    pub projected_events_by_kind: BTreeMap<String, usize>,
    pub events_saved: usize,
    pub bytes_saved: usize,
    pub events_saved_pct: f64,
    pub bytes_saved_pct: f64,
}

pub fn project(counters: &FusionCounters) -> FusionReport {
    let mut projected: BTreeMap<String, usize> = BTreeMap::new();
    for (kind, &count) in &counters.events_by_kind {
        // Start events are absorbed into the terminal event
        if kind.ends_with(":start") {
            continue;
        }
        let target = match kind.strip_suffix(":end") {
            Some(prefix) => format!("{}:completed", prefix),
            None => kind.clone(),
        };
        *projected.entry(target).or_insert(0) += count;
    }

    let projected_events: usize = projected.values().sum();
    let projected_bytes = counters
        .total_bytes
        .saturating_sub(counters.duplicated_bytes);

    let events_saved = counters.total_events - projected_events;
    let bytes_saved = counters.total_bytes - projected_bytes;

    FusionReport {
        total_events: counters.total_events,
        total_bytes: counters.total_bytes,
        unique_calls: counters.unique_calls,
        duplicated_bytes: counters.duplicated_bytes,
        events_by_kind: counters.events_by_kind.clone(),
        projected_events,
        projected_bytes,
        projected_events_by_kind: projected,
        events_saved,
        bytes_saved,
        events_saved_pct: percentage(events_saved, counters.total_events),
        bytes_saved_pct: percentage(bytes_saved, counters.total_bytes),
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
