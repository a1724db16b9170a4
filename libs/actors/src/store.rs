//! Actor-owned relation state
//!
//! A [`StoreSet`] is the fixed-at-construction mapping from schema name to a
//! mutable store, owned exclusively by one actor. The runtime's generic
//! insert fallback resolves relation names against it; nothing outside the
//! owning actor ever touches these stores directly.

use crate::EngineError;
use relation::{MutableRelation, Record, RelationError};
use std::collections::HashMap;
use tracing::debug;

/// Schema-name-addressed collection of mutable stores.
#[derive(Default)]
pub struct StoreSet {
    stores: HashMap<String, Box<dyn MutableRelation>>,
}

impl StoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store under its schema name.
    ///
    /// Fails with a schema-incompatibility error if the name is taken.
    pub fn add(&mut self, store: impl MutableRelation + 'static) -> Result<(), EngineError> {
        let name = store.schema().name().to_string();
        if self.stores.contains_key(&name) {
            return Err(RelationError::IncompatibleSchema {
                detail: format!("store '{}' is already declared", name),
            }
            .into());
        }
        self.stores.insert(name, Box::new(store));
        Ok(())
    }

    pub fn get(&self, relation: &str) -> Option<&dyn MutableRelation> {
        self.stores.get(relation).map(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, relation: &str) -> Option<&mut (dyn MutableRelation + 'static)> {
        self.stores.get_mut(relation).map(|s| s.as_mut())
    }

    /// Resolve a store by name or fail with relation-not-found.
    pub fn relation(&self, relation: &str) -> Result<&dyn MutableRelation, EngineError> {
        self.get(relation).ok_or_else(|| EngineError::RelationNotFound {
            relation: relation.to_string(),
        })
    }

    /// Mutable counterpart of [`StoreSet::relation`].
    pub fn relation_mut(
        &mut self,
        relation: &str,
    ) -> Result<&mut (dyn MutableRelation + 'static), EngineError> {
        self.stores
            .get_mut(relation)
            .map(|s| s.as_mut())
            .ok_or_else(|| EngineError::RelationNotFound {
                relation: relation.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    /// Generic name-addressed insert backing the runtime fallback.
    ///
    /// Inserts are best-effort like [`MutableRelation::insert_all`]: accepted
    /// records stay inserted. The reply-level outcome is all-or-error — the
    /// count of inserted records when every record was accepted, otherwise
    /// the first rejection.
    pub fn insert_into(
        &mut self,
        relation: &str,
        records: Vec<Record>,
    ) -> Result<usize, EngineError> {
        let store = self.relation_mut(relation)?;
        let outcomes = store.insert_all(records);
        let total = outcomes.len();
        for outcome in outcomes {
            outcome?;
        }
        debug!(relation, inserted = total, "generic insert applied");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relation::{ColumnDef, Record, Relation, RelationDef, Rows};
    use std::sync::Arc;

    fn films() -> Arc<RelationDef> {
        RelationDef::new("films", [ColumnDef::text("title"), ColumnDef::int("year")]).unwrap()
    }

    fn film(title: &str) -> Record {
        Record::build(films()).set("title", title).finish().unwrap()
    }

    #[test]
    fn duplicate_store_name_is_rejected() {
        let mut stores = StoreSet::new();
        stores.add(Rows::new(films())).unwrap();
        let err = stores.add(Rows::new(films())).unwrap_err();
        assert!(matches!(err, EngineError::Relation(_)));
    }

    #[test]
    fn insert_into_unknown_relation_is_not_found() {
        let mut stores = StoreSet::new();
        let err = stores.insert_into("actors", vec![film("Alien")]).unwrap_err();
        assert!(matches!(err, EngineError::RelationNotFound { .. }));
    }

    #[test]
    fn insert_into_counts_accepted_records() {
        let mut stores = StoreSet::new();
        stores.add(Rows::new(films())).unwrap();
        let count = stores
            .insert_into("films", vec![film("Alien"), film("Aliens")])
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(stores.relation("films").unwrap().len(), 2);
    }

    #[test]
    fn insert_into_reports_first_rejection_but_keeps_accepted_rows() {
        let other = RelationDef::new("actors", [ColumnDef::text("name")]).unwrap();
        let foreign = Record::build(other).set("name", "Weaver").finish().unwrap();

        let mut stores = StoreSet::new();
        stores.add(Rows::new(films())).unwrap();
        let err = stores
            .insert_into("films", vec![film("Alien"), foreign])
            .unwrap_err();
        assert!(matches!(err, EngineError::Relation(_)));
        assert_eq!(stores.relation("films").unwrap().len(), 1);
    }
}
