//! Keyed id generation for repositories.

use crate::factory::SequenceObjectFactory;
use seqpool_core::error::{SequenceError, SequenceErrorKind};
use seqpool_core::{Error, Result};

/// First id handed out for a sequence nobody has configured.
pub const DEFAULT_START_VALUE: i64 = 1000;

/// Generates unique sequential ids, one sequence per entity name.
pub trait SequenceGenerator: Send + Sync {
    /// Next id for `sequence_name`.
    fn next_id(&self, sequence_name: &str) -> i64;

    /// Reserve `count` ids for `sequence_name`.
    fn next_ids(&self, sequence_name: &str, count: usize) -> Result<Vec<i64>> {
        if count == 0 {
            return Err(Error::Sequence(SequenceError {
                kind: SequenceErrorKind::InvalidBatch,
                sequence: sequence_name.to_string(),
                message: "count must be positive".to_string(),
            }));
        }
        Ok((0..count).map(|_| self.next_id(sequence_name)).collect())
    }

    /// Make the next id for `sequence_name` equal `value`.
    fn reset_sequence(&self, sequence_name: &str, value: i64);
}

/// Thread-safe generator keeping every sequence in memory.
///
/// Sequences are created lazily at the configured start value. Nothing is
/// persisted.
#[derive(Debug)]
pub struct InMemorySequenceGenerator {
    factory: SequenceObjectFactory,
    start_value: i64,
}

impl InMemorySequenceGenerator {
    pub fn new() -> Self {
        Self {
            factory: SequenceObjectFactory::new(),
            start_value: DEFAULT_START_VALUE,
        }
    }

    /// Fails if `increment_by` is below 1.
    pub fn with_settings(start_value: i64, increment_by: i64) -> Result<Self> {
        Ok(Self {
            factory: SequenceObjectFactory::with_increment(increment_by)?,
            start_value,
        })
    }

    /// Set the start value for sequences created from now on.
    pub fn start_value(mut self, value: i64) -> Self {
        self.start_value = value;
        self
    }

    /// Set the increment. Drops any sequences already created. Fails if
    /// `increment` is below 1.
    pub fn increment_by(self, increment: i64) -> Result<Self> {
        Self::with_settings(self.start_value, increment)
    }

    /// Drop every sequence; the next request for any name starts over.
    pub fn clear_all(&self) {
        self.factory.clear();
    }

    /// Names of sequences that have been used.
    pub fn sequence_names(&self) -> Vec<String> {
        self.factory.names()
    }
}

impl Default for InMemorySequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceGenerator for InMemorySequenceGenerator {
    fn next_id(&self, sequence_name: &str) -> i64 {
        self.factory
            .sequence(sequence_name, self.start_value)
            .next_value()
    }

    fn next_ids(&self, sequence_name: &str, count: usize) -> Result<Vec<i64>> {
        self.factory
            .sequence(sequence_name, self.start_value)
            .next_values(count)
    }

    fn reset_sequence(&self, sequence_name: &str, value: i64) {
        self.factory
            .sequence(sequence_name, value)
            .set_value(value);
    }
}
