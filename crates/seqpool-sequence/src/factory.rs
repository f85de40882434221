//! Sequence lookup by name.

use crate::counter::{SequenceCounter, check_increment};
use seqpool_core::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Hands out one shared [`SequenceCounter`] per sequence name.
///
/// The first request for a name creates its counter with the caller's
/// initial value; later requests get the same counter back and their initial
/// value is ignored. Lookup and creation happen under one lock, so racing
/// first requests still produce a single counter.
#[derive(Debug)]
pub struct SequenceObjectFactory {
    sequences: Mutex<HashMap<String, Arc<SequenceCounter>>>,
    increment: i64,
}

impl SequenceObjectFactory {
    pub fn new() -> Self {
        Self {
            sequences: Mutex::new(HashMap::new()),
            increment: 1,
        }
    }

    /// Counters created by this factory advance by `increment`, which must
    /// be at least 1.
    pub fn with_increment(increment: i64) -> Result<Self> {
        let increment = check_increment("*", increment)?;
        Ok(Self {
            increment,
            ..Self::new()
        })
    }

    /// Get the counter for `name`, creating it at `initial_value` if needed.
    pub fn sequence(&self, name: &str, initial_value: i64) -> Arc<SequenceCounter> {
        let mut sequences = self.sequences.lock().unwrap();
        if let Some(existing) = sequences.get(name) {
            return Arc::clone(existing);
        }

        tracing::debug!(sequence = name, initial_value, "creating in-memory sequence");
        let counter = Arc::new(SequenceCounter::build(
            name.to_string(),
            initial_value,
            self.increment,
        ));
        sequences.insert(name.to_string(), Arc::clone(&counter));
        counter
    }

    /// Get the counter for `name` if it has been created.
    pub fn get(&self, name: &str) -> Option<Arc<SequenceCounter>> {
        self.sequences.lock().unwrap().get(name).cloned()
    }

    /// Forget every counter. Handles already given out keep working but are
    /// no longer reachable through the factory.
    pub fn clear(&self) {
        self.sequences.lock().unwrap().clear();
    }

    /// Names of all sequences created so far, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sequences.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sequences.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.lock().unwrap().is_empty()
    }
}

impl Default for SequenceObjectFactory {
    fn default() -> Self {
        Self::new()
    }
}
