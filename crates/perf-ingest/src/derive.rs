//! Derivation of typed tuples from raw records.
//!
//! Output positions follow the destination table's column order, not the
//! source file's header order. Each table column is resolved to a raw index
//! through the header map; columns flagged invalid become `Null` without
//! being read.

use std::fmt;

use perf_model::{InvalidColumnSet, PrimitiveType, TableSchema, TypedTuple, Value};
use perf_validate::parse_decimal;
use serde::Serialize;

use crate::reader::{HeaderMap, RawRecord};

/// Why a field that passed validation could still not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CoercionIssueKind {
    /// Decimal column value did not parse.
    UnparseableDecimal { raw: String },
    /// Record is shorter than the resolved column index.
    MissingField,
    /// Header not present in the file's header map.
    UnresolvedHeader,
}

/// A field nulled during derivation although it was not flagged invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionIssue {
    pub table: String,
    pub header: String,
    /// Raw column index, when the header resolved.
    pub column: Option<usize>,
    pub kind: CoercionIssueKind,
}

impl fmt::Display for CoercionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CoercionIssueKind::UnparseableDecimal { raw } => write!(
                f,
                "{}.{}: value '{raw}' is not a decimal",
                self.table, self.header
            ),
            CoercionIssueKind::MissingField => write!(
                f,
                "{}.{}: record has no field at column {}",
                self.table,
                self.header,
                self.column.unwrap_or_default()
            ),
            CoercionIssueKind::UnresolvedHeader => {
                write!(f, "{}.{}: header not in file", self.table, self.header)
            }
        }
    }
}

/// Tuple for one table plus any coercion anomalies met while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTuple {
    pub tuple: TypedTuple,
    pub issues: Vec<CoercionIssue>,
}

/// Build the tuple for `schema` from one record.
///
/// Never fails: anomalies null the affected field and are returned alongside
/// the tuple. The tuple always has exactly one value per schema column.
pub fn derive_tuple(
    record: &RawRecord,
    schema: &TableSchema,
    invalid: &InvalidColumnSet,
    headers: &HeaderMap,
) -> DerivedTuple {
    let mut tuple = TypedTuple::with_capacity(schema.len());
    let mut issues = Vec::new();

    for column in &schema.columns {
        let issue = |column_idx: Option<usize>, kind: CoercionIssueKind| CoercionIssue {
            table: schema.name.clone(),
            header: column.header.clone(),
            column: column_idx,
            kind,
        };

        let Some(idx) = headers.index_of(&column.header) else {
            issues.push(issue(None, CoercionIssueKind::UnresolvedHeader));
            tuple.push(Value::Null);
            continue;
        };
        if invalid.contains(&idx) {
            tuple.push(Value::Null);
            continue;
        }
        let Some(raw) = record.get(idx) else {
            issues.push(issue(Some(idx), CoercionIssueKind::MissingField));
            tuple.push(Value::Null);
            continue;
        };

        match column.ty {
            PrimitiveType::Text => tuple.push(Value::Text(raw.to_string())),
            PrimitiveType::Decimal => match parse_decimal(raw) {
                Some(value) => tuple.push(Value::Decimal(value)),
                None => {
                    issues.push(issue(
                        Some(idx),
                        CoercionIssueKind::UnparseableDecimal {
                            raw: raw.to_string(),
                        },
                    ));
                    tuple.push(Value::Null);
                }
            },
        }
    }

    DerivedTuple { tuple, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perf_model::ColumnSpec;

    fn schema() -> TableSchema {
        TableSchema::new(
            "io",
            vec![
                ColumnSpec::text("serial_number"),
                ColumnSpec::decimal("read_iops"),
                ColumnSpec::decimal("write_iops"),
            ],
        )
    }

    fn headers() -> HeaderMap {
        HeaderMap::from_headers(["write_iops", "read_iops", "serial_number"]).unwrap()
    }

    #[test]
    fn remaps_into_schema_order() {
        let record = RawRecord::from_fields(["7", "3.5", "SN1"]);
        let derived = derive_tuple(&record, &schema(), &InvalidColumnSet::new(), &headers());
        assert_eq!(
            derived.tuple.values(),
            [
                Value::Text("SN1".into()),
                Value::Decimal(3.5),
                Value::Decimal(7.0)
            ]
        );
        assert!(derived.issues.is_empty());
    }

    #[test]
    fn invalid_columns_are_null_without_parsing() {
        // Column 1 holds a valid numeral but is flagged invalid anyway.
        let record = RawRecord::from_fields(["7", "3.5", "SN1"]);
        let invalid = InvalidColumnSet::from([1]);
        let derived = derive_tuple(&record, &schema(), &invalid, &headers());
        assert_eq!(derived.tuple.get(1), Some(&Value::Null));
        assert_eq!(derived.tuple.get(2), Some(&Value::Decimal(7.0)));
        assert!(derived.issues.is_empty());
    }

    #[test]
    fn unflagged_bad_decimal_becomes_issue() {
        let record = RawRecord::from_fields(["oops", "1", "SN1"]);
        let derived = derive_tuple(&record, &schema(), &InvalidColumnSet::new(), &headers());
        assert_eq!(derived.tuple.get(2), Some(&Value::Null));
        assert_eq!(derived.tuple.len(), 3);
        assert_eq!(derived.issues.len(), 1);
        assert_eq!(
            derived.issues[0].to_string(),
            "io.write_iops: value 'oops' is not a decimal"
        );
    }

    #[test]
    fn short_record_nulls_missing_fields() {
        let record = RawRecord::from_fields(["1"]);
        let derived = derive_tuple(&record, &schema(), &InvalidColumnSet::new(), &headers());
        assert_eq!(derived.tuple.len(), 3);
        assert_eq!(derived.tuple.null_count(), 2);
        assert!(
            derived
                .issues
                .iter()
                .all(|issue| issue.kind == CoercionIssueKind::MissingField)
        );
    }

    #[test]
    fn unresolved_header_is_reported() {
        let headers = HeaderMap::from_headers(["read_iops", "write_iops"]).unwrap();
        let record = RawRecord::from_fields(["1", "2"]);
        let derived = derive_tuple(&record, &schema(), &InvalidColumnSet::new(), &headers);
        assert_eq!(derived.tuple.get(0), Some(&Value::Null));
        assert_eq!(derived.issues[0].kind, CoercionIssueKind::UnresolvedHeader);
        assert_eq!(derived.issues[0].column, None);
    }

    #[test]
    fn text_is_carried_verbatim() {
        let record = RawRecord::from_fields(["1", "2", "  SN 1  "]);
        let derived = derive_tuple(&record, &schema(), &InvalidColumnSet::new(), &headers());
        assert_eq!(derived.tuple.get(0), Some(&Value::Text("  SN 1  ".into())));
    }
}
