//! Schema model for performance data ingestion.
//!
//! Declares the primitive column types, the per-file record layouts, the
//! destination table schemas and the immutable [`SchemaRegistry`] that ties
//! them together, plus the typed values produced for each table.

#![deny(unsafe_code)]

pub mod error;
pub mod registry;
pub mod types;
pub mod value;

pub use error::{Result, SchemaError};
pub use registry::{DEFAULT_IDENTITY_TABLE, SchemaRegistry, SchemaRegistryBuilder};
pub use types::{ColumnSpec, PrimitiveType, RecordLayout, TableSchema};
pub use value::{InvalidColumnSet, TypedTuple, Value};
