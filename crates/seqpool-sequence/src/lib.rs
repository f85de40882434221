//! Named integer sequences held in process memory.
//!
//! - [`SequenceCounter`] - one named counter, safe to share between threads
//! - [`SequenceObjectFactory`] - hands out the counter for a name, creating it
//!   on first request
//! - [`InMemorySequenceGenerator`] - keyed id generator with batch reservation
//!
//! Nothing here is durable: every counter starts over when the process does.
//!
//! # Example
//!
//! ```rust
//! use seqpool_sequence::{SequenceObjectFactory, SequenceSource};
//!
//! let factory = SequenceObjectFactory::new();
//! let orders = factory.sequence("Order", 100);
//! assert_eq!(orders.next(), 100);
//! assert_eq!(orders.next(), 101);
//! ```

pub mod counter;
pub mod factory;
pub mod generator;

pub use counter::{SequenceCounter, SequenceSource};
pub use factory::SequenceObjectFactory;
pub use generator::{DEFAULT_START_VALUE, InMemorySequenceGenerator, SequenceGenerator};
