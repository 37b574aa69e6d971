use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw column indices whose values do not conform to their declared type.
///
/// Indices refer to positions in the source record, not in any table.
pub type InvalidColumnSet = BTreeSet<usize>;

/// A single coerced field of an output tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    Text(String),
    Decimal(f64),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    /// Equality that compares decimals by bit pattern.
    pub fn bit_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Decimal(a), Value::Decimal(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text}"),
            Value::Decimal(value) => write!(f, "{value}"),
            Value::Null => Ok(()),
        }
    }
}

/// Ordered values for one destination table, one slot per table column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedTuple {
    values: Vec<Value>,
}

impl TypedTuple {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_null()).count()
    }

    /// True when both tuples hold the same values, decimals compared bitwise.
    pub fn bit_eq(&self, other: &TypedTuple) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.bit_eq(b))
    }
}

impl From<Vec<Value>> for TypedTuple {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl IntoIterator for TypedTuple {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_eq_distinguishes_signed_zero() {
        let positive = TypedTuple::from(vec![Value::Decimal(0.0)]);
        let negative = TypedTuple::from(vec![Value::Decimal(-0.0)]);
        assert_eq!(positive, negative);
        assert!(!positive.bit_eq(&negative));
        assert!(positive.bit_eq(&positive.clone()));
    }

    #[test]
    fn value_serializes_tagged() {
        let json = serde_json::to_string(&Value::Decimal(1.5)).expect("serialize value");
        assert_eq!(json, r#"{"kind":"Decimal","value":1.5}"#);
        let null = serde_json::to_string(&Value::Null).expect("serialize null");
        assert_eq!(null, r#"{"kind":"Null"}"#);
    }

    #[test]
    fn null_renders_empty() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Text("OK".into()).to_string(), "OK");
        assert_eq!(Value::Decimal(42.0).to_string(), "42");
    }
}
