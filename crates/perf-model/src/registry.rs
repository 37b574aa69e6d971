//! Immutable registry of destination tables.
//!
//! A registry is built once from a declaration (the embedded default, a TOML
//! file, or [`SchemaRegistryBuilder`]) and validated as a whole before any
//! record is processed. Afterwards it is read-only and shared by reference.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SchemaError};
use crate::types::{ColumnSpec, RecordLayout, TableSchema};

/// Name of the reserved table describing summary rows.
pub const DEFAULT_IDENTITY_TABLE: &str = "system";

const BUILTIN_SCHEMA: &str = include_str!("../schemas/default.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDeclaration {
    #[serde(default = "default_identity_table")]
    identity_table: String,
    #[serde(default)]
    summary: Vec<ColumnSpec>,
    #[serde(default)]
    detail: Vec<ColumnSpec>,
    #[serde(default)]
    tables: Vec<TableDeclaration>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDeclaration {
    name: String,
    columns: Vec<String>,
}

fn default_identity_table() -> String {
    DEFAULT_IDENTITY_TABLE.to_string()
}

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    identity_table: String,
    summary: RecordLayout,
    detail: RecordLayout,
    tables: Vec<TableSchema>,
    index: BTreeMap<String, usize>,
}

impl SchemaRegistry {
    /// Registry for the embedded storage-array performance schema.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_SCHEMA)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let declaration: SchemaDeclaration = toml::from_str(text)?;
        let mut builder = SchemaRegistryBuilder::new()
            .identity_table(declaration.identity_table)
            .summary_columns(declaration.summary)
            .detail_columns(declaration.detail);
        for table in declaration.tables {
            builder = builder.table(table.name, table.columns);
        }
        builder.build()
    }

    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// Look up a table by name.
    pub fn schema_for(&self, table: &str) -> Result<&TableSchema> {
        self.index
            .get(table)
            .map(|&idx| &self.tables[idx])
            .ok_or_else(|| SchemaError::TableNotFound {
                table: table.to_string(),
            })
    }

    /// Destination tables for per-record fan-out, in declaration order.
    ///
    /// The identity table is excluded.
    pub fn table_names(&self) -> Vec<&str> {
        self.destination_tables()
            .map(|table| table.name.as_str())
            .collect()
    }

    pub fn destination_tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables
            .iter()
            .filter(|table| table.name != self.identity_table)
    }

    /// All declared tables, identity table included.
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn identity_table(&self) -> &str {
        &self.identity_table
    }

    pub fn summary_layout(&self) -> &RecordLayout {
        &self.summary
    }

    pub fn detail_layout(&self) -> &RecordLayout {
        &self.detail
    }

    /// Positions of `Decimal` columns in the detail layout.
    pub fn decimal_positions(&self) -> Vec<usize> {
        self.detail.decimal_positions()
    }

    /// Every header a destination table reads from detail records.
    pub fn referenced_detail_headers(&self) -> BTreeSet<&str> {
        self.destination_tables()
            .flat_map(|table| table.headers())
            .collect()
    }
}

/// Incremental declaration of a [`SchemaRegistry`].
#[derive(Debug, Clone)]
pub struct SchemaRegistryBuilder {
    identity_table: String,
    summary: Vec<ColumnSpec>,
    detail: Vec<ColumnSpec>,
    tables: Vec<(String, Vec<String>)>,
}

impl Default for SchemaRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self {
            identity_table: default_identity_table(),
            summary: Vec::new(),
            detail: Vec::new(),
            tables: Vec::new(),
        }
    }

    #[must_use]
    pub fn identity_table(mut self, name: impl Into<String>) -> Self {
        self.identity_table = name.into();
        self
    }

    #[must_use]
    pub fn summary_columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.summary.extend(columns);
        self
    }

    #[must_use]
    pub fn detail_columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.detail.extend(columns);
        self
    }

    #[must_use]
    pub fn table<I, S>(mut self, name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .push((name.into(), headers.into_iter().map(Into::into).collect()));
        self
    }

    /// Validate the declaration and resolve every table column's type.
    pub fn build(self) -> Result<SchemaRegistry> {
        if self.detail.is_empty() {
            return Err(SchemaError::EmptyLayout);
        }
        check_unique_headers("summary", &self.summary)?;
        check_unique_headers("detail", &self.detail)?;
        let summary = RecordLayout::new(self.summary);
        let detail = RecordLayout::new(self.detail);

        let mut tables = Vec::with_capacity(self.tables.len());
        let mut index = BTreeMap::new();
        for (name, headers) in self.tables {
            if name.trim().is_empty() {
                return Err(SchemaError::EmptyTableName);
            }
            if index.contains_key(&name) {
                return Err(SchemaError::DuplicateTable { table: name });
            }
            if headers.is_empty() {
                return Err(SchemaError::EmptyTable { table: name });
            }
            let (layout_name, layout) = if name == self.identity_table {
                ("summary", &summary)
            } else {
                ("detail", &detail)
            };
            let mut seen = BTreeSet::new();
            let mut columns = Vec::with_capacity(headers.len());
            for header in headers {
                if !seen.insert(header.clone()) {
                    return Err(SchemaError::DuplicateColumn {
                        table: name,
                        header,
                    });
                }
                let Some(declared) = layout.column(&header) else {
                    return Err(SchemaError::UnknownHeader {
                        table: name,
                        header,
                        layout: layout_name,
                    });
                };
                columns.push(declared.clone());
            }
            index.insert(name.clone(), tables.len());
            tables.push(TableSchema::new(name, columns));
        }

        if !index.contains_key(&self.identity_table) {
            return Err(SchemaError::TableNotFound {
                table: self.identity_table,
            });
        }

        Ok(SchemaRegistry {
            identity_table: self.identity_table,
            summary,
            detail,
            tables,
            index,
        })
    }
}

fn check_unique_headers(layout: &'static str, columns: &[ColumnSpec]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for column in columns {
        if !seen.insert(column.header.as_str()) {
            return Err(SchemaError::DuplicateLayoutHeader {
                layout,
                header: column.header.clone(),
            });
        }
    }
    Ok(())
}
