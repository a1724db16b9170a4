//! Records: immutable, fully populated tuples
//!
//! A [`Record`] maps every column of one schema to a value; it is only
//! constructed through [`RecordBuilder`], which accepts assignments in any
//! order and fills the gaps from each column's declared default at build
//! time. A built record's column set always equals the schema's column set
//! exactly.

use crate::column::ColumnDefault;
use crate::schema::RelationDef;
use crate::value::Value;
use crate::RelationError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Immutable typed tuple over one schema, values in slot order.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<RelationDef>,
    values: Vec<Value>,
}

impl Record {
    /// Start building a record for the given schema.
    pub fn build(schema: Arc<RelationDef>) -> RecordBuilder {
        let slots = vec![None; schema.arity()];
        RecordBuilder {
            schema,
            slots,
            error: None,
        }
    }

    pub fn schema(&self) -> &Arc<RelationDef> {
        &self.schema
    }

    /// Values in schema slot order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of the named column.
    pub fn get(&self, column: &str) -> Result<&Value, RelationError> {
        match self.schema.slot(column) {
            Some(slot) => Ok(&self.values[slot]),
            None => Err(RelationError::incompatible(format!(
                "column '{}' is not part of relation '{}'",
                column,
                self.schema.name()
            ))),
        }
    }

    /// Integer value of the named column; `None` when the cell is null.
    pub fn get_int(&self, column: &str) -> Result<Option<i64>, RelationError> {
        Ok(self.get(column)?.as_int())
    }

    /// Text value of the named column; `None` when the cell is null.
    pub fn get_text(&self, column: &str) -> Result<Option<&str>, RelationError> {
        Ok(self.get(column)?.as_text())
    }

    /// Boolean value of the named column; `None` when the cell is null.
    pub fn get_bool(&self, column: &str) -> Result<Option<bool>, RelationError> {
        Ok(self.get(column)?.as_bool())
    }

    pub(crate) fn from_parts(schema: Arc<RelationDef>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.arity(), values.len());
        Self { schema, values }
    }

    pub(crate) fn value_at(&self, slot: usize) -> &Value {
        &self.values[slot]
    }

    pub(crate) fn set_value_at(&mut self, slot: usize, value: Value) {
        self.values[slot] = value;
    }
}

// Equality is pairwise over ((name, type), value); the relation name is not
// part of record identity, so records of compatible schemas can compare equal.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.columns() == other.schema.columns() && self.values == other.values
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (col, value) in self.schema.columns().iter().zip(&self.values) {
            col.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (col, value)) in self.schema.columns().iter().zip(&self.values).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", col.name(), value)?;
        }
        write!(f, "}}")
    }
}

/// Incremental record builder.
///
/// Assignment errors (unknown column, type mismatch) are remembered and
/// reported by [`RecordBuilder::finish`], so `set` calls chain without
/// intermediate `?`.
#[derive(Debug)]
pub struct RecordBuilder {
    schema: Arc<RelationDef>,
    slots: Vec<Option<Value>>,
    error: Option<RelationError>,
}

impl RecordBuilder {
    /// Assign a value to a column, in any order. Later assignments to the
    /// same column overwrite earlier ones.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let value = value.into();
        match self.schema.slot(column) {
            Some(slot) => {
                let col = &self.schema.columns()[slot];
                if value.fits(col.value_type()) {
                    self.slots[slot] = Some(value);
                } else {
                    self.error = Some(RelationError::incompatible(format!(
                        "value {} does not fit column '{}' of type {}",
                        value,
                        col.name(),
                        col.value_type()
                    )));
                }
            }
            None => {
                self.error = Some(RelationError::incompatible(format!(
                    "column '{}' is not part of relation '{}'",
                    column,
                    self.schema.name()
                )));
            }
        }
        self
    }

    /// Finish the record, filling unassigned columns from their defaults.
    ///
    /// Fails if any assignment was invalid or a required column is missing.
    pub fn finish(self) -> Result<Record, RelationError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut values = Vec::with_capacity(self.schema.arity());
        for (slot, col) in self.slots.into_iter().zip(self.schema.columns()) {
            match slot {
                Some(value) => values.push(value),
                None => match col.default() {
                    ColumnDefault::Value(default) => values.push(default.clone()),
                    ColumnDefault::Null => values.push(Value::Null),
                    ColumnDefault::Required => {
                        return Err(RelationError::incompatible(format!(
                            "required column '{}' of relation '{}' was not assigned",
                            col.name(),
                            self.schema.name()
                        )))
                    }
                },
            }
        }

        Ok(Record::from_parts(self.schema, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;

    fn films() -> Arc<RelationDef> {
        RelationDef::new(
            "films",
            [
                ColumnDef::text("title").required(),
                ColumnDef::int("year"),
                ColumnDef::bool("available").with_default(true).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn build_fills_defaults_and_matches_schema_exactly() {
        let record = Record::build(films()).set("title", "Alien").finish().unwrap();

        assert_eq!(record.values().len(), 3);
        assert_eq!(record.get_text("title").unwrap(), Some("Alien"));
        assert_eq!(record.get("year").unwrap(), &Value::Null);
        assert_eq!(record.get_bool("available").unwrap(), Some(true));
    }

    #[test]
    fn assignments_accepted_in_any_order() {
        let a = Record::build(films())
            .set("year", 1979i64)
            .set("title", "Alien")
            .finish()
            .unwrap();
        let b = Record::build(films())
            .set("title", "Alien")
            .set("year", 1979i64)
            .finish()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_required_column_fails() {
        let err = Record::build(films()).set("year", 1979i64).finish().unwrap_err();
        assert!(matches!(err, RelationError::IncompatibleSchema { .. }));
    }

    #[test]
    fn unknown_column_fails() {
        let err = Record::build(films())
            .set("title", "Alien")
            .set("director", "Scott")
            .finish()
            .unwrap_err();
        assert!(matches!(err, RelationError::IncompatibleSchema { .. }));
    }

    #[test]
    fn type_mismatch_fails() {
        let err = Record::build(films())
            .set("title", "Alien")
            .set("year", "nineteen-seventy-nine")
            .finish()
            .unwrap_err();
        assert!(matches!(err, RelationError::IncompatibleSchema { .. }));
    }

    #[test]
    fn equality_ignores_relation_name() {
        let catalog = RelationDef::new(
            "catalog",
            [
                ColumnDef::text("title"),
                ColumnDef::int("year"),
                ColumnDef::bool("available"),
            ],
        )
        .unwrap();

        let a = Record::build(films()).set("title", "Alien").finish().unwrap();
        let b = Record::build(catalog)
            .set("title", "Alien")
            .set("available", true)
            .finish()
            .unwrap();
        assert_eq!(a, b);
    }
}
