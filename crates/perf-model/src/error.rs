//! Error types for schema declaration and lookup.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or querying a [`SchemaRegistry`](crate::SchemaRegistry).
#[derive(Debug, Error)]
pub enum SchemaError {
    // === Lookup ===
    /// Destination table referenced but never declared.
    #[error("schema not found for table '{table}'")]
    TableNotFound { table: String },

    // === Declaration ===
    /// Failed to read a schema declaration file.
    #[error("failed to read schema file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Declaration is not valid TOML or has the wrong shape.
    #[error("invalid schema declaration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The detail layout declares no columns.
    #[error("detail layout declares no columns")]
    EmptyLayout,

    /// A header appears twice in one layout.
    #[error("duplicate header '{header}' in {layout} layout")]
    DuplicateLayoutHeader { layout: &'static str, header: String },

    /// Two tables share a name.
    #[error("table '{table}' is declared more than once")]
    DuplicateTable { table: String },

    /// A table has an empty name.
    #[error("table name must not be empty")]
    EmptyTableName,

    /// A table declares no columns.
    #[error("table '{table}' declares no columns")]
    EmptyTable { table: String },

    /// A header appears twice in one table.
    #[error("duplicate header '{header}' in table '{table}'")]
    DuplicateColumn { table: String, header: String },

    /// A table column names a header its layout does not declare.
    #[error("table '{table}' references header '{header}' missing from the {layout} layout")]
    UnknownHeader {
        table: String,
        header: String,
        layout: &'static str,
    },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
