//! Typed cell values
//!
//! Every cell in a relation holds a [`Value`]. The variant set is deliberately
//! small: real-valued data (prices, ratios) is stored as scaled integers so
//! that values stay `Eq + Hash` and no precision is lost in transit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime value stored in a record cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Absent value; matches any column type.
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int,
    Text,
}

impl Value {
    /// The type of this value, or `None` for `Null` (which fits any column).
    pub fn type_of(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Text(_) => Some(ValueType::Text),
        }
    }

    /// Whether this value may be stored in a column of the given type.
    pub fn fits(&self, ty: ValueType) -> bool {
        match self.type_of() {
            None => true,
            Some(own) => own == ty,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Text => write!(f, "text"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_fits_every_type() {
        assert!(Value::Null.fits(ValueType::Bool));
        assert!(Value::Null.fits(ValueType::Int));
        assert!(Value::Null.fits(ValueType::Text));
        assert_eq!(Value::Null.type_of(), None);
    }

    #[test]
    fn typed_values_fit_only_their_type() {
        assert!(Value::Int(7).fits(ValueType::Int));
        assert!(!Value::Int(7).fits(ValueType::Text));
        assert!(Value::Text("x".into()).fits(ValueType::Text));
        assert!(!Value::Bool(true).fits(ValueType::Int));
    }

    #[test]
    fn from_impls_produce_expected_variants() {
        assert_eq!(Value::from(42i64), Value::Int(42));
        assert_eq!(Value::from("abc"), Value::Text("abc".to_string()));
        assert_eq!(Value::from(true), Value::Bool(true));
    }
}
