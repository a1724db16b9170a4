//! Column identifiers
//!
//! A [`ColumnDef`] names a column, fixes its value type, and carries an
//! explicit default policy. Identity is by value: two definitions are equal
//! iff name and type match, wherever they were declared. The default is
//! deliberately excluded from equality so that structurally identical schemas
//! compare equal even when defaults differ.

use crate::value::{Value, ValueType};
use crate::RelationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// What a record builder fills in when a column was not assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnDefault {
    /// Fill with this value.
    Value(Value),
    /// Fill with [`Value::Null`].
    Null,
    /// No default; building a record without assigning the column fails.
    Required,
}

/// Named, typed column identifier with an explicit default policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    name: String,
    value_type: ValueType,
    default: ColumnDefault,
}

impl ColumnDef {
    /// New column with an explicit type; defaults to null when unassigned.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            default: ColumnDefault::Null,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Int)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Text)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Bool)
    }

    /// Attach a default value. Fails if the value does not fit the column type.
    pub fn with_default(mut self, value: impl Into<Value>) -> Result<Self, RelationError> {
        let value = value.into();
        if !value.fits(self.value_type) {
            return Err(RelationError::incompatible(format!(
                "default {} does not fit column '{}' of type {}",
                value, self.name, self.value_type
            )));
        }
        self.default = ColumnDefault::Value(value);
        Ok(self)
    }

    /// Mark the column as required: record builds must assign it explicitly.
    pub fn required(mut self) -> Self {
        self.default = ColumnDefault::Required;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn default(&self) -> &ColumnDefault {
        &self.default
    }
}

// Identity by (name, type) only; the default policy never participates.
impl PartialEq for ColumnDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value_type == other.value_type
    }
}

impl Eq for ColumnDef {}

impl Hash for ColumnDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.value_type.hash(state);
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value_type)
    }
}
