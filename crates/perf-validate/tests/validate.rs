//! Property tests for detail record validation.

use perf_model::{PrimitiveType, SchemaRegistry};
use perf_validate::{Validator, parse_decimal, validate_detail};
use proptest::prelude::*;

fn raw_field() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i64>().prop_map(|v| v.to_string()),
        any::<f64>().prop_map(|v| v.to_string()),
        Just("N/A".to_string()),
        Just(String::new()),
        "[a-zA-Z ./-]{0,12}",
    ]
}

proptest! {
    #[test]
    fn invalid_set_is_bounded_by_decimal_columns(
        fields in proptest::collection::vec(raw_field(), 0..30)
    ) {
        let registry = SchemaRegistry::builtin().expect("builtin schema");
        let layout = registry.detail_layout();
        let invalid = validate_detail(fields.iter().map(String::as_str), layout);

        prop_assert!(invalid.len() <= layout.decimal_positions().len());
        for idx in &invalid {
            prop_assert_eq!(layout.type_at(*idx), Some(PrimitiveType::Decimal));
        }
    }

    #[test]
    fn decimal_columns_fail_iff_unparseable(
        fields in proptest::collection::vec(raw_field(), 22)
    ) {
        let registry = SchemaRegistry::builtin().expect("builtin schema");
        let layout = registry.detail_layout();
        let invalid = validate_detail(fields.iter().map(String::as_str), layout);

        for (idx, raw) in fields.iter().enumerate() {
            let expect_invalid =
                layout.type_at(idx) == Some(PrimitiveType::Decimal) && parse_decimal(raw).is_none();
            prop_assert_eq!(invalid.contains(&idx), expect_invalid);
        }
    }
}

#[test]
fn validator_counts_visited_fields() {
    let registry = SchemaRegistry::builtin().expect("builtin schema");
    let validator = Validator::new(&registry);

    let mut fields = vec!["1700000000", "SN42", "host", "model", "1.0"];
    fields.extend(std::iter::repeat_n("5", 15));
    fields.push("OK");
    fields.push("N/A");

    let result = validator.detail(fields.iter().copied());
    assert_eq!(result.checked, 22);
    assert!(!result.is_clean());
    assert_eq!(result.invalid.iter().copied().collect::<Vec<_>>(), vec![21]);

    assert!(validator.summary(["42", "host"]).is_empty());
}
