//! A single named counter.

use seqpool_core::error::{SequenceError, SequenceErrorKind};
use seqpool_core::{Error, Result};
use std::sync::Mutex;

/// Capability interface for a source of increasing identifiers.
pub trait SequenceSource: Send + Sync {
    /// Return the next identifier and advance the source.
    fn next(&self) -> i64;

    /// Make the next call to [`next`](SequenceSource::next) return `value`.
    fn reset(&self, value: i64);

    /// Name of the sequence, for diagnostics.
    fn name(&self) -> String;
}

/// Reject steps that would repeat or decrease ids.
pub(crate) fn check_increment(sequence: &str, increment: i64) -> Result<i64> {
    if increment < 1 {
        return Err(Error::Sequence(SequenceError {
            kind: SequenceErrorKind::InvalidIncrement,
            sequence: sequence.to_string(),
            message: format!("increment must be at least 1, got {increment}"),
        }));
    }
    Ok(increment)
}

#[derive(Debug)]
struct CounterState {
    name: String,
    current_value: i64,
}

/// A named counter handing out `v, v + step, v + 2*step, ...`.
///
/// Name and value live behind one mutex, so every read-and-advance is a single
/// critical section: two callers never receive the same value and no value
/// is skipped.
#[derive(Debug)]
pub struct SequenceCounter {
    state: Mutex<CounterState>,
    increment: i64,
}

impl SequenceCounter {
    /// Create a counter whose first value is `initial_value`.
    pub fn new(name: impl Into<String>, initial_value: i64) -> Self {
        Self::build(name.into(), initial_value, 1)
    }

    /// Create a counter advancing by `increment` per id. The increment must
    /// be at least 1.
    pub fn with_increment(
        name: impl Into<String>,
        initial_value: i64,
        increment: i64,
    ) -> Result<Self> {
        let name = name.into();
        let increment = check_increment(&name, increment)?;
        Ok(Self::build(name, initial_value, increment))
    }

    /// `increment` must already have passed [`check_increment`].
    pub(crate) fn build(name: String, initial_value: i64, increment: i64) -> Self {
        Self {
            state: Mutex::new(CounterState {
                name,
                current_value: initial_value,
            }),
            increment,
        }
    }

    /// Return the current value and advance the counter.
    pub fn next_value(&self) -> i64 {
        let mut state = self.state.lock().unwrap();
        let value = state.current_value;
        state.current_value = value.wrapping_add(self.increment);
        if state.current_value < value {
            tracing::warn!(sequence = %state.name, value, "sequence wrapped around i64::MAX");
        }
        value
    }

    /// Reserve `count` consecutive ids in one step.
    ///
    /// Ids from one batch are never interleaved with ids handed to other
    /// callers.
    pub fn next_values(&self, count: usize) -> Result<Vec<i64>> {
        let mut state = self.state.lock().unwrap();
        if count == 0 {
            return Err(Error::Sequence(SequenceError {
                kind: SequenceErrorKind::InvalidBatch,
                sequence: state.name.clone(),
                message: "count must be positive".to_string(),
            }));
        }

        let start = state.current_value;
        let end = i64::try_from(count)
            .ok()
            .and_then(|n| n.checked_mul(self.increment))
            .and_then(|span| start.checked_add(span))
            .ok_or_else(|| {
                Error::Sequence(SequenceError {
                    kind: SequenceErrorKind::Overflow,
                    sequence: state.name.clone(),
                    message: format!("reserving {count} ids from {start} overflows"),
                })
            })?;
        state.current_value = end;

        Ok((0..count as i64).map(|i| start + i * self.increment).collect())
    }

    /// Overwrite the counter so the next call returns `value`.
    ///
    /// Any value is accepted, including one lower than ids already issued.
    pub fn set_value(&self, value: i64) {
        let mut state = self.state.lock().unwrap();
        tracing::debug!(sequence = %state.name, from = state.current_value, to = value, "sequence reset");
        state.current_value = value;
    }

    /// Replace the stored name. The counter value is untouched.
    pub fn rename(&self, new_name: impl Into<String>) {
        self.state.lock().unwrap().name = new_name.into();
    }

    /// The value the next call to [`next_value`](Self::next_value) returns.
    pub fn peek(&self) -> i64 {
        self.state.lock().unwrap().current_value
    }

    pub fn name(&self) -> String {
        self.state.lock().unwrap().name.clone()
    }

    pub fn increment(&self) -> i64 {
        self.increment
    }
}

impl SequenceSource for SequenceCounter {
    fn next(&self) -> i64 {
        self.next_value()
    }

    fn reset(&self, value: i64) {
        self.set_value(value);
    }

    fn name(&self) -> String {
        SequenceCounter::name(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn sequential_values_from_initial() {
        let seq = SequenceCounter::new("Order", 100);
        assert_eq!(seq.next_value(), 100);
        assert_eq!(seq.next_value(), 101);
        assert_eq!(seq.next_value(), 102);
    }

    #[test]
    fn set_value_is_returned_next() {
        let seq = SequenceCounter::new("Order", 1);
        seq.next_value();
        seq.set_value(2000);
        assert_eq!(seq.next_value(), 2000);

        // Going backwards is allowed.
        seq.set_value(-5);
        assert_eq!(seq.next_value(), -5);
        assert_eq!(seq.next_value(), -4);
    }

    #[test]
    fn rename_keeps_value() {
        let seq = SequenceCounter::new("Order", 7);
        seq.next_value();
        seq.rename("Invoice");
        assert_eq!(seq.name(), "Invoice");
        assert_eq!(seq.next_value(), 8);
    }

    #[test]
    fn custom_increment() {
        let seq = SequenceCounter::with_increment("Product", 1000, 10).unwrap();
        assert_eq!(seq.next_value(), 1000);
        assert_eq!(seq.next_value(), 1010);
        assert_eq!(seq.peek(), 1020);
    }

    #[test]
    fn batches_are_contiguous() {
        let seq = SequenceCounter::with_increment("Product", 1000, 5).unwrap();
        assert_eq!(seq.next_values(3).unwrap(), vec![1000, 1005, 1010]);
        assert_eq!(seq.next_value(), 1015);
    }

    #[test]
    fn zero_or_negative_increment_is_rejected() {
        for increment in [0, -1, i64::MIN] {
            match SequenceCounter::with_increment("Order", 100, increment) {
                Err(Error::Sequence(e)) => {
                    assert_eq!(e.kind, SequenceErrorKind::InvalidIncrement);
                    assert_eq!(e.sequence, "Order");
                }
                other => panic!("increment {increment} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        let seq = SequenceCounter::new("Order", 1);
        match seq.next_values(0) {
            Err(Error::Sequence(e)) => {
                assert_eq!(e.kind, SequenceErrorKind::InvalidBatch);
                assert_eq!(e.sequence, "Order");
            }
            other => panic!("expected sequence error, got {other:?}"),
        }
        assert_eq!(seq.peek(), 1);
    }

    #[test]
    fn batch_overflow_leaves_counter_alone() {
        let seq = SequenceCounter::new("Order", i64::MAX - 1);
        assert!(matches!(
            seq.next_values(5),
            Err(Error::Sequence(SequenceError {
                kind: SequenceErrorKind::Overflow,
                ..
            }))
        ));
        assert_eq!(seq.peek(), i64::MAX - 1);
    }

    #[test]
    fn concurrent_callers_get_each_value_once() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 250;

        let seq = Arc::new(SequenceCounter::new("Order", 500));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || {
                    (0..PER_THREAD)
                        .map(|_| seq.next_value())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = Vec::with_capacity(THREADS * PER_THREAD);
        for handle in handles {
            all.extend(handle.join().unwrap());
        }
        all.sort_unstable();

        let expected: Vec<i64> = (500..500 + (THREADS * PER_THREAD) as i64).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn concurrent_batches_do_not_overlap() {
        let seq = Arc::new(SequenceCounter::new("Customer", 1000));
        let handles: Vec<_> = (0..5)
            .map(|_| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || seq.next_values(10).unwrap())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let batch = handle.join().unwrap();
            assert!(batch.windows(2).all(|w| w[1] == w[0] + 1));
            for id in batch {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn usable_through_trait_object() {
        let source: Box<dyn SequenceSource> = Box::new(SequenceCounter::new("Order", 3));
        assert_eq!(source.next(), 3);
        source.reset(10);
        assert_eq!(source.next(), 10);
        assert_eq!(source.name(), "Order");
    }
}
