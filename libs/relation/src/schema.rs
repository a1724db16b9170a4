//! Relation definitions (schemas)
//!
//! A [`RelationDef`] is a named, duplicate-free set of columns. Column order
//! as declared is not significant; internally columns are kept sorted by name
//! and that order is the slot order for every record of the schema, so
//! column-to-slot translation is a binary search done once per operation
//! rather than once per record.

use crate::column::ColumnDef;
use crate::RelationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Named, fixed set of typed columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    name: String,
    /// Sorted by column name; index in this vector is the record slot.
    columns: Vec<ColumnDef>,
}

impl RelationDef {
    /// Build a schema from a name and column set.
    ///
    /// Fails with a schema-incompatibility error if two columns share a name.
    pub fn new(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = ColumnDef>,
    ) -> Result<Arc<Self>, RelationError> {
        let name = name.into();
        let mut columns: Vec<ColumnDef> = columns.into_iter().collect();
        columns.sort_by(|a, b| a.name().cmp(b.name()));

        for pair in columns.windows(2) {
            if pair[0].name() == pair[1].name() {
                return Err(RelationError::incompatible(format!(
                    "relation '{}' declares column '{}' twice",
                    name,
                    pair[0].name()
                )));
            }
        }

        Ok(Arc::new(Self { name, columns }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in slot order (sorted by name).
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    /// Slot index of the named column, if present.
    pub fn slot(&self, column: &str) -> Option<usize> {
        self.columns
            .binary_search_by(|c| c.name().cmp(column))
            .ok()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.slot(name).map(|i| &self.columns[i])
    }

    pub fn contains(&self, column: &str) -> bool {
        self.slot(column).is_some()
    }

    /// Structural compatibility: same (name, type) column set. Relation names
    /// and column defaults do not participate.
    pub fn compatible_with(&self, other: &RelationDef) -> bool {
        self.columns == other.columns
    }

    /// Derive the sub-schema keeping only the named columns.
    ///
    /// Fails if any requested column is not part of this schema.
    pub fn project(&self, keep: &[&str]) -> Result<Arc<Self>, RelationError> {
        let mut columns = Vec::with_capacity(keep.len());
        for name in keep {
            match self.column(name) {
                Some(col) => columns.push(col.clone()),
                None => {
                    return Err(RelationError::incompatible(format!(
                        "projection column '{}' is not part of relation '{}'",
                        name, self.name
                    )))
                }
            }
        }
        RelationDef::new(self.name.clone(), columns)
    }
}

impl fmt::Display for RelationDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", col)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn films() -> Arc<RelationDef> {
        RelationDef::new(
            "films",
            [
                ColumnDef::text("title"),
                ColumnDef::int("year"),
                ColumnDef::bool("available"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_column_names_are_rejected() {
        let err = RelationDef::new("bad", [ColumnDef::int("id"), ColumnDef::text("id")])
            .unwrap_err();
        assert!(matches!(err, RelationError::IncompatibleSchema { .. }));
    }

    #[test]
    fn slot_order_is_sorted_by_name() {
        let def = films();
        assert_eq!(def.slot("available"), Some(0));
        assert_eq!(def.slot("title"), Some(1));
        assert_eq!(def.slot("year"), Some(2));
        assert_eq!(def.slot("director"), None);
    }

    #[test]
    fn declaration_order_does_not_matter_for_compatibility() {
        let a = films();
        let b = RelationDef::new(
            "catalog",
            [
                ColumnDef::bool("available"),
                ColumnDef::text("title"),
                ColumnDef::int("year"),
            ],
        )
        .unwrap();
        assert!(a.compatible_with(&b));
    }

    #[test]
    fn projection_derives_sub_schema() {
        let def = films();
        let projected = def.project(&["title", "year"]).unwrap();
        assert_eq!(projected.arity(), 2);
        assert!(projected.contains("title"));
        assert!(!projected.contains("available"));

        assert!(def.project(&["director"]).is_err());
    }
}
