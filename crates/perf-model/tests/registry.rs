//! Tests for schema declaration loading.

use std::io::Write;

use perf_model::{PrimitiveType, SchemaError, SchemaRegistry};
use tempfile::NamedTempFile;

#[test]
fn builtin_schema_loads() {
    let registry = SchemaRegistry::builtin().expect("builtin schema");

    assert_eq!(registry.identity_table(), "system");
    assert_eq!(registry.detail_layout().len(), 22);
    assert_eq!(
        registry.table_names(),
        vec!["cpu", "memory", "io", "network", "capacity", "health"]
    );

    let health = registry.schema_for("health").expect("health table");
    let types: Vec<PrimitiveType> = health.columns.iter().map(|c| c.ty).collect();
    assert_eq!(
        types,
        vec![
            PrimitiveType::Text,
            PrimitiveType::Decimal,
            PrimitiveType::Text,
            PrimitiveType::Decimal,
        ]
    );

    let system = registry.schema_for("system").expect("identity table");
    assert!(system.columns.iter().all(|c| c.ty == PrimitiveType::Text));
}

#[test]
fn builtin_decimal_positions_match_layout() {
    let registry = SchemaRegistry::builtin().expect("builtin schema");
    let positions = registry.decimal_positions();

    assert_eq!(positions.first(), Some(&0));
    assert!(!positions.contains(&1));
    assert!(!positions.contains(&20));
    assert_eq!(positions.len(), 17);
}

#[test]
fn builtin_headers_referenced_by_destinations() {
    let registry = SchemaRegistry::builtin().expect("builtin schema");
    let headers = registry.referenced_detail_headers();

    assert!(headers.contains("timestamp"));
    assert!(headers.contains("status"));
    // Only the identity table reads these.
    assert!(!headers.contains("hostname"));
    assert!(!headers.contains("firmware"));
}

#[test]
fn loads_declaration_from_file() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"
identity_table = "devices"

[[summary]]
header = "id"
type = "text"

[[detail]]
header = "id"
type = "string"

[[detail]]
header = "reading"
type = "double"

[[tables]]
name = "devices"
columns = ["id"]

[[tables]]
name = "readings"
columns = ["reading", "id"]
"#
    )
    .expect("write schema");

    let registry = SchemaRegistry::from_path(file.path()).expect("load schema");
    assert_eq!(registry.identity_table(), "devices");
    assert_eq!(registry.table_names(), vec!["readings"]);
    let readings = registry.schema_for("readings").expect("readings");
    assert_eq!(readings.columns[0].ty, PrimitiveType::Decimal);
}

#[test]
fn identity_table_resolves_against_summary_layout() {
    let text = r#"
[[summary]]
header = "serial"
type = "text"

[[detail]]
header = "value"
type = "decimal"

[[tables]]
name = "system"
columns = ["value"]
"#;
    let err = SchemaRegistry::from_toml_str(text).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownHeader {
            layout: "summary",
            ..
        }
    ));
}

#[test]
fn rejects_unknown_type() {
    let text = r#"
[[detail]]
header = "value"
type = "integer"
"#;
    let err = SchemaRegistry::from_toml_str(text).unwrap_err();
    assert!(matches!(err, SchemaError::Parse(_)));
}

#[test]
fn rejects_unknown_fields() {
    let text = r#"
identity = "system"
"#;
    assert!(matches!(
        SchemaRegistry::from_toml_str(text),
        Err(SchemaError::Parse(_))
    ));
}

#[test]
fn rejects_empty_detail_layout() {
    let text = r#"
[[tables]]
name = "system"
columns = ["id"]
"#;
    assert!(matches!(
        SchemaRegistry::from_toml_str(text),
        Err(SchemaError::EmptyLayout)
    ));
}

#[test]
fn rejects_duplicate_layout_header() {
    let text = r#"
[[detail]]
header = "value"
type = "decimal"

[[detail]]
header = "value"
type = "text"
"#;
    assert!(matches!(
        SchemaRegistry::from_toml_str(text),
        Err(SchemaError::DuplicateLayoutHeader {
            layout: "detail",
            ..
        })
    ));
}

#[test]
fn missing_file_reports_path() {
    let err = SchemaRegistry::from_path(std::path::Path::new("/nonexistent/schema.toml"))
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/schema.toml"));
}
