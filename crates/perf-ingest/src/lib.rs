//! Summary/detail CSV ingestion.
//!
//! Reads a summary file listing entities, opens each entity's
//! `<id>-perform.csv` detail file, validates every detail record once and
//! derives one typed tuple per destination table, handing each to a
//! [`DataInserter`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use perf_ingest::{DataPaths, Engine, LogInserter};
//! use perf_model::SchemaRegistry;
//!
//! let registry = Arc::new(SchemaRegistry::builtin()?);
//! let engine = Engine::new(registry, DataPaths::new("data/"), Arc::new(LogInserter::new()));
//! let report = engine.run(["systems.csv"]);
//! println!("{report}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

pub mod derive;
pub mod engine;
pub mod error;
pub mod paths;
pub mod reader;
pub mod report;
pub mod sink;

pub use derive::{CoercionIssue, CoercionIssueKind, DerivedTuple, derive_tuple};
pub use engine::{Engine, EngineOptions, TableOutcome};
pub use error::{DispatchError, IngestError, Result, SinkError};
pub use paths::{DETAIL_SUFFIX, DataPaths};
pub use reader::{CsvSource, Dialect, HeaderMap, RawRecord, Records};
pub use report::{EntityReport, Failure, FailureKind, IngestReport, SummaryReport, TableCounts};
pub use sink::{CsvDirInserter, DataInserter, InsertedRow, LogInserter, MemoryInserter};
