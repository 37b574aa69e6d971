//! Primitive column types and column declarations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Expected primitive type of a source column.
///
/// Only two types exist: any raw text is a valid `Text` value, while
/// `Decimal` columns must hold a finite decimal numeral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrimitiveType {
    Text,
    Decimal,
}

impl PrimitiveType {
    /// Returns the canonical name as it appears in schema declarations.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Text => "text",
            PrimitiveType::Decimal => "decimal",
        }
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, PrimitiveType::Decimal)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrimitiveType {
    type Err = String;

    /// Parse a declared type name (case-insensitive, common aliases accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "string" | "char" => Ok(PrimitiveType::Text),
            "decimal" | "double" | "number" | "num" => Ok(PrimitiveType::Decimal),
            _ => Err(format!("unknown primitive type: {s}")),
        }
    }
}

impl TryFrom<String> for PrimitiveType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PrimitiveType> for String {
    fn from(value: PrimitiveType) -> Self {
        value.as_str().to_string()
    }
}

/// One column of a table or layout: a header name and its expected type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub header: String,
    #[serde(rename = "type")]
    pub ty: PrimitiveType,
}

impl ColumnSpec {
    pub fn new(header: impl Into<String>, ty: PrimitiveType) -> Self {
        Self {
            header: header.into(),
            ty,
        }
    }

    pub fn text(header: impl Into<String>) -> Self {
        Self::new(header, PrimitiveType::Text)
    }

    pub fn decimal(header: impl Into<String>) -> Self {
        Self::new(header, PrimitiveType::Decimal)
    }
}

/// Positional shape of one source-file kind.
///
/// Position `i` of the layout is the expected type of raw column `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordLayout {
    columns: Vec<ColumnSpec>,
}

impl RecordLayout {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Expected type at a raw position; `None` past the declared columns.
    pub fn type_at(&self, position: usize) -> Option<PrimitiveType> {
        self.columns.get(position).map(|column| column.ty)
    }

    /// Look up a declared column by header name.
    pub fn column(&self, header: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.header == header)
    }

    /// Positions declared as `Decimal`.
    pub fn decimal_positions(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.ty.is_decimal())
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// A destination table: ordered columns defining the output tuple order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.header.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_aliases() {
        assert_eq!("Decimal".parse(), Ok(PrimitiveType::Decimal));
        assert_eq!(" double ".parse(), Ok(PrimitiveType::Decimal));
        assert_eq!("STRING".parse(), Ok(PrimitiveType::Text));
        assert!("integer".parse::<PrimitiveType>().is_err());
    }

    #[test]
    fn layout_reports_decimal_positions() {
        let layout = RecordLayout::new(vec![
            ColumnSpec::decimal("timestamp"),
            ColumnSpec::text("serial_number"),
            ColumnSpec::decimal("read_iops"),
        ]);
        assert_eq!(layout.decimal_positions(), vec![0, 2]);
        assert_eq!(layout.type_at(1), Some(PrimitiveType::Text));
        assert_eq!(layout.type_at(3), None);
        assert_eq!(layout.column("read_iops").map(|c| c.ty), Some(PrimitiveType::Decimal));
    }
}
