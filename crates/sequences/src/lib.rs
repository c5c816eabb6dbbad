//! Gapless integer sequences stored in a relational database.
//!
//! Each named sequence is one row holding its last allocated value. Allocation locks that row,
//! increments it and writes it back inside the caller's transaction, so a value is spent only
//! when that transaction commits and a rollback hands the same value to the next caller.

pub mod allocator;
pub mod config;
pub mod dialect;
pub mod error;
pub mod registry;
pub mod retry;
pub mod sequence;
pub mod storage;

pub use allocator::{
    delete, get_last_value, get_next_value, get_next_values, SequenceOptions, DEFAULT_NAME,
};
pub use dialect::Dialect;
pub use error::{Result, SequenceError};
pub use registry::{Database, Databases};
pub use retry::{retry_transaction, RetryConfig};
pub use sequence::Sequence;
