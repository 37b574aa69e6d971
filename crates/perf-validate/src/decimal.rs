//! Decimal numeral checks shared by validation and coercion.
//!
//! A raw value is a decimal when its trimmed text parses as a finite `f64`.
//! Empty text, `NaN` and infinities are rejected.

/// Parse a raw field as a decimal numeral.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// True when `raw` is accepted as a decimal numeral.
pub fn is_decimal(raw: &str) -> bool {
    parse_decimal(raw).is_some()
}
