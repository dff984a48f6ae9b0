use crate::error::{Error, Result};
use crate::payload::Payload;
use gantry_types::EventEnvelope;
use std::collections::HashMap;

/// Merge behavior of one call-record kind. Implemented per category in
/// `merge`; the registry itself is category-agnostic.
pub trait ApplyEvent {
    fn new(id: String) -> Self;
    fn id(&self) -> &str;

    /// Merge one envelope into the record. Must follow the monotonic rule:
    /// a field present in the payload overwrites, an absent field never
    /// clears, and the envelope is appended to the audit trail either way.
    fn apply(&mut self, envelope: EventEnvelope);
}

/// What `Registry::ingest` did with an envelope.
pub struct IngestOutcome {
    pub id: String,
    /// True when this envelope was the first sighting of the id.
    pub created: bool,
}

/// Arena of call records for one category.
///
/// Records live in a `Vec` in first-seen order and are addressed through an
/// id index; they are mutated in place and never removed for the lifetime
/// of a trace-analysis run. Nothing outside the registry holds a reference
/// to a record, which keeps ids from colliding across categories.
pub struct Registry<T: ApplyEvent> {
    records: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: ApplyEvent> Registry<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Look up or create the record for the envelope's `data.id` and merge
    /// the envelope into it. An envelope without an id is rejected with
    /// `MissingField`; state for every other id is untouched.
    pub fn ingest(&mut self, envelope: EventEnvelope) -> Result<IngestOutcome> {
        let id = Payload::new(&envelope.payload)
            .non_empty_str("id")
            .ok_or_else(|| Error::MissingField("id".to_string()))?
            .to_string();

        let (slot, created) = match self.index.get(&id) {
            Some(&slot) => (slot, false),
            None => {
                let slot = self.records.len();
                self.records.push(T::new(id.clone()));
                self.index.insert(id.clone(), slot);
                (slot, true)
            }
        };

        self.records[slot].apply(envelope);
        Ok(IngestOutcome { id, created })
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&slot| &self.records[slot])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.index.get(id).map(|&slot| &mut self.records[slot])
    }

    /// Records in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: ApplyEvent> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
