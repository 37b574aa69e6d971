use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use csv::{Writer, WriterBuilder};
use perf_model::{SchemaRegistry, TypedTuple};

use super::DataInserter;
use crate::error::SinkError;

/// Sink writing each destination table to `<dir>/<table>.csv`.
///
/// Files are created on first insert with a header row taken from the table
/// schema. Null fields are written as empty cells.
pub struct CsvDirInserter {
    dir: PathBuf,
    columns: BTreeMap<String, Vec<String>>,
    writers: Mutex<BTreeMap<String, Writer<File>>>,
}

impl std::fmt::Debug for CsvDirInserter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvDirInserter")
            .field("dir", &self.dir)
            .field("tables", &self.columns.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl CsvDirInserter {
    /// Create the output directory and register every table of `registry`.
    pub fn create(dir: impl AsRef<Path>, registry: &SchemaRegistry) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let columns = registry
            .tables()
            .iter()
            .map(|table| {
                (
                    table.name.clone(),
                    table.headers().map(str::to_string).collect(),
                )
            })
            .collect();
        Ok(Self {
            dir,
            columns,
            writers: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }

    fn open_writer(&self, table: &str, headers: &[String]) -> Result<Writer<File>, SinkError> {
        let path = self.table_path(table);
        let file = File::create(&path).map_err(|source| SinkError::Io {
            table: table.to_string(),
            source,
        })?;
        let mut writer = WriterBuilder::new().from_writer(file);
        writer
            .write_record(headers)
            .map_err(|source| SinkError::Csv {
                table: table.to_string(),
                source,
            })?;
        Ok(writer)
    }
}

impl DataInserter for CsvDirInserter {
    fn insert(&self, table: &str, values: &TypedTuple) -> Result<(), SinkError> {
        let Some(headers) = self.columns.get(table) else {
            return Err(SinkError::Rejected {
                table: table.to_string(),
                reason: "no such table".to_string(),
            });
        };
        if headers.len() != values.len() {
            return Err(SinkError::Rejected {
                table: table.to_string(),
                reason: format!("expected {} values, got {}", headers.len(), values.len()),
            });
        }

        let mut writers = self.writers.lock().map_err(|_| SinkError::Poisoned)?;
        if !writers.contains_key(table) {
            let writer = self.open_writer(table, headers)?;
            writers.insert(table.to_string(), writer);
        }
        let Some(writer) = writers.get_mut(table) else {
            return Err(SinkError::Poisoned);
        };
        writer
            .write_record(values.values().iter().map(ToString::to_string))
            .map_err(|source| SinkError::Csv {
                table: table.to_string(),
                source,
            })
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut writers = self.writers.lock().map_err(|_| SinkError::Poisoned)?;
        for (table, writer) in writers.iter_mut() {
            writer.flush().map_err(|source| SinkError::Io {
                table: table.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perf_model::{ColumnSpec, Value};

    #[test]
    fn writes_header_and_rows_per_table() {
        let registry = SchemaRegistry::builder()
            .summary_columns(vec![ColumnSpec::text("id")])
            .detail_columns(vec![ColumnSpec::text("id"), ColumnSpec::decimal("load")])
            .table("system", ["id"])
            .table("load", ["id", "load"])
            .build()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvDirInserter::create(dir.path().join("out"), &registry).unwrap();

        sink.insert(
            "load",
            &TypedTuple::from(vec![Value::Text("a".into()), Value::Decimal(1.5)]),
        )
        .unwrap();
        sink.insert("load", &TypedTuple::from(vec![Value::Text("b".into()), Value::Null]))
            .unwrap();
        sink.flush().unwrap();

        let written = std::fs::read_to_string(sink.table_path("load")).unwrap();
        assert_eq!(written, "id,load\na,1.5\nb,\n");
        assert!(!sink.table_path("system").exists());
    }

    #[test]
    fn rejects_unknown_table_and_wrong_arity() {
        let registry = SchemaRegistry::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvDirInserter::create(dir.path(), &registry).unwrap();

        let tuple = TypedTuple::from(vec![Value::Null]);
        assert!(matches!(
            sink.insert("disk", &tuple),
            Err(SinkError::Rejected { .. })
        ));
        assert!(matches!(
            sink.insert("cpu", &tuple),
            Err(SinkError::Rejected { .. })
        ));
    }
}
