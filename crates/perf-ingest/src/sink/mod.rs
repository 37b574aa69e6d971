//! Destination sinks for derived tuples.
//!
//! The engine treats every `insert` as an independent unit of work: it only
//! observes success or failure, and a failure for one table never blocks
//! other tables. Batching and durability belong to the sink.

mod csv_dir;
mod log;
mod memory;

use perf_model::TypedTuple;

use crate::error::SinkError;

pub use csv_dir::CsvDirInserter;
pub use log::LogInserter;
pub use memory::{InsertedRow, MemoryInserter};

/// Storage boundary receiving one tuple per (record, table).
pub trait DataInserter: Send + Sync {
    /// Store `values` in `table`.
    fn insert(&self, table: &str, values: &TypedTuple) -> Result<(), SinkError>;

    /// Flush buffered rows. Called once at the end of a run.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<T: DataInserter + ?Sized> DataInserter for std::sync::Arc<T> {
    fn insert(&self, table: &str, values: &TypedTuple) -> Result<(), SinkError> {
        (**self).insert(table, values)
    }

    fn flush(&self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
