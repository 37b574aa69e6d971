//! Record-level validation for summary and detail files.

use perf_model::{InvalidColumnSet, PrimitiveType, RecordLayout, SchemaRegistry};
use tracing::trace;

use crate::decimal::is_decimal;

/// Validate a summary record.
///
/// Summary rows are trusted: no column-level check is performed and the
/// result is always empty.
pub fn validate_summary<'a, I>(_fields: I) -> InvalidColumnSet
where
    I: IntoIterator<Item = &'a str>,
{
    InvalidColumnSet::new()
}

/// Validate a detail record against the positional detail layout.
///
/// Every field is visited once. `Text` positions are always accepted, a
/// `Decimal` position is invalid when its value is not a decimal numeral, and
/// positions past the end of the layout are not typed.
pub fn validate_detail<'a, I>(fields: I, layout: &RecordLayout) -> InvalidColumnSet
where
    I: IntoIterator<Item = &'a str>,
{
    validate_detail_with_headers::<_, &str>(fields, layout, &[])
}

/// Validate a detail record whose file names its columns.
///
/// The expected type of field `i` is the layout type of the header at `i`,
/// so a file whose columns are ordered differently from the layout is still
/// checked column by column. A header the layout does not declare is untyped;
/// fields past the header row fall back to the layout position.
pub fn validate_detail_with_headers<'a, I, H>(
    fields: I,
    layout: &RecordLayout,
    headers: &[H],
) -> InvalidColumnSet
where
    I: IntoIterator<Item = &'a str>,
    H: AsRef<str>,
{
    let mut invalid = InvalidColumnSet::new();
    for (idx, raw) in fields.into_iter().enumerate() {
        let expected = match headers.get(idx) {
            Some(header) => layout.column(header.as_ref()).map(|column| column.ty),
            None => layout.type_at(idx),
        };
        if expected != Some(PrimitiveType::Decimal) {
            continue;
        }
        if !is_decimal(raw) {
            trace!(column = idx, "non-decimal value in decimal column");
            invalid.insert(idx);
        }
    }
    invalid
}

/// Validation entry points bound to one registry.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn summary<'a, I>(&self, fields: I) -> InvalidColumnSet
    where
        I: IntoIterator<Item = &'a str>,
    {
        validate_summary(fields)
    }

    pub fn detail<'a, I>(&self, fields: I) -> RecordValidation
    where
        I: IntoIterator<Item = &'a str>,
    {
        let layout = self.registry.detail_layout();
        let mut checked = 0usize;
        let invalid = validate_detail(
            fields.into_iter().inspect(|_| checked += 1),
            layout,
        );
        RecordValidation { invalid, checked }
    }

    /// Like [`Validator::detail`], typing each field by its header name.
    pub fn detail_with_headers<'a, I, H>(&self, fields: I, headers: &[H]) -> RecordValidation
    where
        I: IntoIterator<Item = &'a str>,
        H: AsRef<str>,
    {
        let layout = self.registry.detail_layout();
        let mut checked = 0usize;
        let invalid = validate_detail_with_headers(
            fields.into_iter().inspect(|_| checked += 1),
            layout,
            headers,
        );
        RecordValidation { invalid, checked }
    }
}

/// Outcome of validating one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordValidation {
    /// Raw column indices that failed their type check.
    pub invalid: InvalidColumnSet,
    /// Number of fields visited.
    pub checked: usize,
}

impl RecordValidation {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perf_model::ColumnSpec;

    fn layout() -> RecordLayout {
        RecordLayout::new(vec![
            ColumnSpec::decimal("timestamp"),
            ColumnSpec::text("serial_number"),
            ColumnSpec::decimal("read_iops"),
            ColumnSpec::text("status"),
        ])
    }

    #[test]
    fn summary_is_always_clean() {
        let invalid = validate_summary(["", "N/A", "not a number"]);
        assert!(invalid.is_empty());
    }

    #[test]
    fn flags_only_decimal_positions() {
        let invalid = validate_detail(["N/A", "N/A", "12", "N/A"], &layout());
        assert_eq!(invalid.into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn fractional_values_are_valid() {
        let invalid = validate_detail(["1700000000.5", "SN1", "2.25", "OK"], &layout());
        assert!(invalid.is_empty());
    }

    #[test]
    fn extra_columns_are_untyped() {
        let invalid = validate_detail(["1", "SN1", "2", "OK", "garbage", "more"], &layout());
        assert!(invalid.is_empty());
    }

    #[test]
    fn reordered_headers_are_typed_by_name() {
        let headers = ["status", "read_iops", "serial_number", "timestamp"];
        let invalid =
            validate_detail_with_headers(["OK", "12", "SN1", "N/A"], &layout(), &headers);
        assert_eq!(invalid.into_iter().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn undeclared_headers_are_untyped() {
        let headers = ["comment", "serial_number"];
        let invalid = validate_detail_with_headers(["N/A", "SN1", "x"], &layout(), &headers);
        // past the header row, position 2 falls back to read_iops
        assert_eq!(invalid.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn short_records_check_present_fields() {
        let invalid = validate_detail(["x"], &layout());
        assert_eq!(invalid.len(), 1);
        assert!(invalid.contains(&0));
    }
}
