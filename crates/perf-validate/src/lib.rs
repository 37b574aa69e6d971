//! Column-level validation of raw records.
//!
//! Validation never fails a record: non-conforming columns are reported as
//! members of an [`InvalidColumnSet`](perf_model::InvalidColumnSet) and the
//! ingestion engine nulls them out.

#![deny(unsafe_code)]

mod decimal;
mod record;

pub use decimal::{is_decimal, parse_decimal};
pub use record::{
    RecordValidation, Validator, validate_detail, validate_detail_with_headers, validate_summary,
};
