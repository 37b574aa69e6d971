use std::sync::atomic::{AtomicUsize, Ordering};

use perf_model::TypedTuple;
use tracing::debug;

use super::DataInserter;
use crate::error::SinkError;

/// Sink that only logs tuples at debug level and counts them.
#[derive(Debug, Default)]
pub struct LogInserter {
    inserted: AtomicUsize,
}

impl LogInserter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inserted(&self) -> usize {
        self.inserted.load(Ordering::Relaxed)
    }
}

impl DataInserter for LogInserter {
    fn insert(&self, table: &str, values: &TypedTuple) -> Result<(), SinkError> {
        self.inserted.fetch_add(1, Ordering::Relaxed);
        debug!(
            table,
            nulls = values.null_count(),
            values = ?values.values(),
            "insert"
        );
        Ok(())
    }
}
