use std::collections::BTreeSet;
use std::sync::Mutex;

use perf_model::TypedTuple;

use super::DataInserter;
use crate::error::SinkError;

/// A tuple accepted by a [`MemoryInserter`].
#[derive(Debug, Clone, PartialEq)]
pub struct InsertedRow {
    pub table: String,
    pub tuple: TypedTuple,
}

/// Sink keeping every accepted tuple in memory, in insertion order.
///
/// Tables can be marked as rejecting to exercise failure handling.
#[derive(Debug, Default)]
pub struct MemoryInserter {
    rows: Mutex<Vec<InsertedRow>>,
    rejected: BTreeSet<String>,
}

impl MemoryInserter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every insert into `table`.
    #[must_use]
    pub fn rejecting(mut self, table: impl Into<String>) -> Self {
        self.rejected.insert(table.into());
        self
    }

    pub fn rows(&self) -> Vec<InsertedRow> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }

    pub fn rows_for(&self, table: &str) -> Vec<TypedTuple> {
        self.rows()
            .into_iter()
            .filter(|row| row.table == table)
            .map(|row| row.tuple)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DataInserter for MemoryInserter {
    fn insert(&self, table: &str, values: &TypedTuple) -> Result<(), SinkError> {
        if self.rejected.contains(table) {
            return Err(SinkError::Rejected {
                table: table.to_string(),
                reason: "table is configured to reject inserts".to_string(),
            });
        }
        let mut rows = self.rows.lock().map_err(|_| SinkError::Poisoned)?;
        rows.push(InsertedRow {
            table: table.to_string(),
            tuple: values.clone(),
        });
        Ok(())
    }
}
