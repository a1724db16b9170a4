//! Relation storage and algebra
//!
//! [`Relation`] is the read-only algebra: selection, projection, bag union,
//! and snapshotting. Reads always return a new [`Transient`] and never mutate
//! the receiver. [`MutableRelation`] adds in-place insert/delete/update and is
//! implemented by the two storage shapes: [`Rows`] (general multi-row store)
//! and [`SingleRow`] (capped at one record, later inserts replace it).
//!
//! Predicate evaluation is column-indexed: filters are translated to slot
//! indices once per operation, so scanning is linear in rows and predicate
//! count, not in schema size.

use crate::record::Record;
use crate::schema::RelationDef;
use crate::value::Value;
use crate::RelationError;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Column predicate evaluated against a single cell.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Conjunction of column-indexed predicates: a record matches iff every
/// entry's predicate holds for that column's value.
#[derive(Clone, Default)]
pub struct Filter {
    entries: Vec<(String, Predicate)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate on the named column.
    pub fn with(
        mut self,
        column: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.entries.push((column.into(), Arc::new(predicate)));
        self
    }

    /// Add an equality predicate on the named column.
    pub fn with_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let expected = value.into();
        self.with(column, move |v| *v == expected)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate column names to slot indices, once per operation.
    fn compile(&self, schema: &RelationDef) -> Result<Vec<(usize, &Predicate)>, RelationError> {
        self.entries
            .iter()
            .map(|(column, pred)| match schema.slot(column) {
                Some(slot) => Ok((slot, pred)),
                None => Err(RelationError::incompatible(format!(
                    "filter column '{}' is not part of relation '{}'",
                    column,
                    schema.name()
                ))),
            })
            .collect()
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<&str> = self.entries.iter().map(|(c, _)| c.as_str()).collect();
        f.debug_struct("Filter").field("columns", &columns).finish()
    }
}

fn matches(compiled: &[(usize, &Predicate)], record: &Record) -> bool {
    compiled
        .iter()
        .all(|(slot, pred)| pred(record.value_at(*slot)))
}

/// Partial column assignment applied by [`MutableRelation::update`].
#[derive(Debug, Clone, Default)]
pub struct Patch {
    entries: Vec<(String, Value)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a new value to the named column on every matching row.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn compile(&self, schema: &RelationDef) -> Result<Vec<(usize, &Value)>, RelationError> {
        self.entries
            .iter()
            .map(|(column, value)| {
                let slot = schema.slot(column).ok_or_else(|| {
                    RelationError::incompatible(format!(
                        "patch column '{}' is not part of relation '{}'",
                        column,
                        schema.name()
                    ))
                })?;
                let col = &schema.columns()[slot];
                if !value.fits(col.value_type()) {
                    return Err(RelationError::incompatible(format!(
                        "patch value {} does not fit column '{}' of type {}",
                        value,
                        col.name(),
                        col.value_type()
                    )));
                }
                Ok((slot, value))
            })
            .collect()
    }
}

/// Read-only relational algebra over a finite bag of records sharing one
/// schema. Every operation returns a new value; receivers are never mutated.
pub trait Relation: Send + Sync {
    fn schema(&self) -> &Arc<RelationDef>;

    /// Records in storage order. Order carries no semantics.
    fn records(&self) -> &[Record];

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Keep records matching every predicate of the filter.
    fn select(&self, filter: &Filter) -> Result<Transient, RelationError> {
        let compiled = filter.compile(self.schema())?;
        let rows = self
            .records()
            .iter()
            .filter(|r| matches(&compiled, r))
            .cloned()
            .collect();
        Ok(Transient::new(Arc::clone(self.schema()), rows))
    }

    /// Keep only the named columns of every record.
    fn project(&self, keep: &[&str]) -> Result<Transient, RelationError> {
        let schema = self.schema();
        let projected = schema.project(keep)?;
        // Every projected column came out of `schema`, so the lookup cannot
        // miss; propagate rather than guess a slot if that ever breaks.
        let slots = projected
            .columns()
            .iter()
            .map(|c| {
                schema.slot(c.name()).ok_or_else(|| {
                    RelationError::incompatible(format!(
                        "projection column '{}' is not part of relation '{}'",
                        c.name(),
                        schema.name()
                    ))
                })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let rows = self
            .records()
            .iter()
            .map(|record| {
                let values = slots.iter().map(|s| record.value_at(*s).clone()).collect();
                Record::from_parts(Arc::clone(&projected), values)
            })
            .collect();
        Ok(Transient::new(projected, rows))
    }

    /// Bag union with another relation of a structurally identical schema.
    /// Duplicates are preserved; commutative and associative on bag contents.
    fn union(&self, other: &dyn Relation) -> Result<Transient, RelationError> {
        if !self.schema().compatible_with(other.schema()) {
            return Err(RelationError::incompatible(format!(
                "union of '{}' and '{}': schemas differ",
                self.schema().name(),
                other.schema().name()
            )));
        }
        let mut rows = Vec::with_capacity(self.len() + other.len());
        rows.extend_from_slice(self.records());
        rows.extend_from_slice(other.records());
        Ok(Transient::new(Arc::clone(self.schema()), rows))
    }

    /// Snapshot the current content, detached from further mutation.
    fn materialize(&self) -> Transient {
        Transient::new(Arc::clone(self.schema()), self.records().to_vec())
    }
}

/// A relation supporting in-place mutation. Each operation returns a result
/// value; relation errors never cross the actor boundary as faults.
pub trait MutableRelation: Relation {
    /// Append a record. Fails if the record's column set differs from the
    /// relation's schema.
    fn insert(&mut self, record: Record) -> Result<(), RelationError>;

    /// Best-effort batch insert: one outcome per record, no batch abort.
    /// Accepted records stay inserted when later ones fail.
    fn insert_all(&mut self, records: Vec<Record>) -> Vec<Result<(), RelationError>> {
        records.into_iter().map(|r| self.insert(r)).collect()
    }

    /// Remove the first record equal to the given one. Fails with
    /// record-not-found if no such record exists.
    fn delete(&mut self, record: &Record) -> Result<(), RelationError>;

    /// Overwrite the patched columns on every record matching the filter.
    /// Returns the number of affected records.
    fn update(&mut self, patch: &Patch, filter: &Filter) -> Result<usize, RelationError>;
}

/// General multi-row store.
#[derive(Debug, Clone)]
pub struct Rows {
    schema: Arc<RelationDef>,
    rows: Vec<Record>,
}

impl Rows {
    pub fn new(schema: Arc<RelationDef>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    fn check_schema(&self, record: &Record) -> Result<(), RelationError> {
        if record.schema().compatible_with(&self.schema) {
            Ok(())
        } else {
            Err(RelationError::incompatible(format!(
                "record columns do not match relation '{}'",
                self.schema.name()
            )))
        }
    }
}

impl Relation for Rows {
    fn schema(&self) -> &Arc<RelationDef> {
        &self.schema
    }

    fn records(&self) -> &[Record] {
        &self.rows
    }
}

impl MutableRelation for Rows {
    fn insert(&mut self, record: Record) -> Result<(), RelationError> {
        self.check_schema(&record)?;
        self.rows.push(record);
        debug!(relation = %self.schema.name(), rows = self.rows.len(), "record inserted");
        Ok(())
    }

    fn delete(&mut self, record: &Record) -> Result<(), RelationError> {
        self.check_schema(record)?;
        match self.rows.iter().position(|r| r == record) {
            Some(pos) => {
                self.rows.remove(pos);
                debug!(relation = %self.schema.name(), rows = self.rows.len(), "record deleted");
                Ok(())
            }
            None => Err(RelationError::not_found(self.schema.name())),
        }
    }

    fn update(&mut self, patch: &Patch, filter: &Filter) -> Result<usize, RelationError> {
        let assignments = patch.compile(&self.schema)?;
        let compiled = filter.compile(&self.schema)?;

        let mut affected = 0;
        for record in &mut self.rows {
            if matches(&compiled, record) {
                for (slot, value) in &assignments {
                    record.set_value_at(*slot, (*value).clone());
                }
                affected += 1;
            }
        }
        debug!(relation = %self.schema.name(), affected, "update applied");
        Ok(affected)
    }
}

/// Store permanently capped at one record.
///
/// The first insert stores the record; every later insert replaces it
/// (register semantics). Delete and update behave as on a one-row [`Rows`].
#[derive(Debug, Clone)]
pub struct SingleRow {
    inner: Rows,
}

impl SingleRow {
    pub fn new(schema: Arc<RelationDef>) -> Self {
        Self {
            inner: Rows::new(schema),
        }
    }

    /// The current record, if one was inserted.
    pub fn current(&self) -> Option<&Record> {
        self.inner.rows.first()
    }
}

impl Relation for SingleRow {
    fn schema(&self) -> &Arc<RelationDef> {
        self.inner.schema()
    }

    fn records(&self) -> &[Record] {
        self.inner.records()
    }
}

impl MutableRelation for SingleRow {
    fn insert(&mut self, record: Record) -> Result<(), RelationError> {
        self.inner.check_schema(&record)?;
        if let Some(existing) = self.inner.rows.first_mut() {
            debug!(relation = %self.inner.schema.name(), "single-row record replaced");
            *existing = record;
        } else {
            self.inner.rows.push(record);
        }
        Ok(())
    }

    fn delete(&mut self, record: &Record) -> Result<(), RelationError> {
        self.inner.delete(record)
    }

    fn update(&mut self, patch: &Patch, filter: &Filter) -> Result<usize, RelationError> {
        self.inner.update(patch, filter)
    }
}

/// Computed, non-growable read view.
///
/// Wraps an already-computed record sequence so selection and projection
/// results chain without touching backing storage. This is also the value
/// carried inside protocol Success replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transient {
    schema: Arc<RelationDef>,
    rows: Vec<Record>,
}

impl Transient {
    pub fn new(schema: Arc<RelationDef>, rows: Vec<Record>) -> Self {
        Self { schema, rows }
    }

    /// Empty view over the given schema.
    pub fn empty(schema: Arc<RelationDef>) -> Self {
        Self::new(schema, Vec::new())
    }

    /// Consume the view, yielding its records.
    pub fn into_records(self) -> Vec<Record> {
        self.rows
    }
}

impl Relation for Transient {
    fn schema(&self) -> &Arc<RelationDef> {
        &self.schema
    }

    fn records(&self) -> &[Record] {
        &self.rows
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

    fn film(title: &str, year: i64) -> Record {
        Record::build(films())
            .set("title", title)
            .set("year", year)
            .finish()
            .unwrap()
    }

    #[test]
    fn insert_then_select_finds_the_record() {
        let mut store = Rows::new(films());
        let alien = film("Alien", 1979);
        store.insert(alien.clone()).unwrap();

        let hit = store
            .select(&Filter::new().with_eq("title", "Alien"))
            .unwrap();
        assert_eq!(hit.records(), &[alien]);

        let miss = store
            .select(&Filter::new().with_eq("title", "Blade Runner"))
            .unwrap();
        assert!(miss.is_empty());
    }

    #[test]
    fn select_on_unknown_column_fails() {
        let store = Rows::new(films());
        let err = store
            .select(&Filter::new().with_eq("director", "Scott"))
            .unwrap_err();
        assert!(matches!(err, RelationError::IncompatibleSchema { .. }));
    }

    #[test]
    fn select_is_a_conjunction() {
        let mut store = Rows::new(films());
        store.insert(film("Alien", 1979)).unwrap();
        store.insert(film("Aliens", 1986)).unwrap();

        let filter = Filter::new()
            .with("year", |v| v.as_int().is_some_and(|y| y > 1980))
            .with("title", |v| {
                v.as_text().is_some_and(|t| t.starts_with("Alien"))
            });
        let hits = store.select(&filter).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.records()[0].get_text("title").unwrap(), Some("Aliens"));
    }

    #[test]
    fn projection_keeps_only_requested_columns() {
        let mut store = Rows::new(films());
        store.insert(film("Alien", 1979)).unwrap();

        let titles = store.project(&["title"]).unwrap();
        assert_eq!(titles.schema().arity(), 1);
        assert_eq!(
            titles.records()[0].get_text("title").unwrap(),
            Some("Alien")
        );
        assert!(titles.records()[0].get("year").is_err());

        assert!(store.project(&["director"]).is_err());
    }

    #[test]
    fn projection_maps_values_to_their_columns_in_any_request_order() {
        let mut store = Rows::new(films());
        store.insert(film("Alien", 1979)).unwrap();

        // requested order differs from the schema's slot order
        let view = store.project(&["year", "title"]).unwrap();
        assert_eq!(view.records()[0].get_text("title").unwrap(), Some("Alien"));
        assert_eq!(view.records()[0].get_int("year").unwrap(), Some(1979));
    }

    #[test]
    fn union_preserves_duplicates_and_checks_schemas() {
        let mut a = Rows::new(films());
        let mut b = Rows::new(films());
        a.insert(film("Alien", 1979)).unwrap();
        b.insert(film("Alien", 1979)).unwrap();

        let both = a.union(&b).unwrap();
        assert_eq!(both.len(), 2);

        let other = RelationDef::new("actors", [ColumnDef::text("name")]).unwrap();
        let err = a.union(&Rows::new(other)).unwrap_err();
        assert!(matches!(err, RelationError::IncompatibleSchema { .. }));
    }

    #[test]
    fn delete_is_left_inverse_of_insert() {
        let mut store = Rows::new(films());
        store.insert(film("Alien", 1979)).unwrap();
        let before = store.materialize();

        let aliens = film("Aliens", 1986);
        store.insert(aliens.clone()).unwrap();
        store.delete(&aliens).unwrap();
        assert_eq!(store.materialize(), before);

        let err = store.delete(&film("Blade Runner", 1982)).unwrap_err();
        assert!(matches!(err, RelationError::RecordNotFound { .. }));
    }

    #[test]
    fn insert_rejects_foreign_schema() {
        let other = RelationDef::new("actors", [ColumnDef::text("name")]).unwrap();
        let foreign = Record::build(other).set("name", "Weaver").finish().unwrap();

        let mut store = Rows::new(films());
        let err = store.insert(foreign).unwrap_err();
        assert!(matches!(err, RelationError::IncompatibleSchema { .. }));
    }

    #[test]
    fn insert_all_is_best_effort() {
        let other = RelationDef::new("actors", [ColumnDef::text("name")]).unwrap();
        let foreign = Record::build(other).set("name", "Weaver").finish().unwrap();

        let mut store = Rows::new(films());
        let outcomes = store.insert_all(vec![film("Alien", 1979), foreign, film("Aliens", 1986)]);

        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());
        assert!(outcomes[2].is_ok());
        // accepted records stay inserted around the rejected one
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_touches_only_matching_rows_and_named_columns() {
        let mut store = Rows::new(films());
        store.insert(film("Alien", 1979)).unwrap();
        store.insert(film("Aliens", 1986)).unwrap();

        let affected = store
            .update(
                &Patch::new().set("available", false),
                &Filter::new().with_eq("title", "Alien"),
            )
            .unwrap();
        assert_eq!(affected, 1);

        let alien = store
            .select(&Filter::new().with_eq("title", "Alien"))
            .unwrap();
        assert_eq!(alien.records()[0].get_bool("available").unwrap(), Some(false));

        // non-matching row is deep-equal to before
        let aliens = store
            .select(&Filter::new().with_eq("title", "Aliens"))
            .unwrap();
        assert_eq!(aliens.records()[0], film("Aliens", 1986));
    }

    #[test]
    fn update_rejects_foreign_patch_columns() {
        let mut store = Rows::new(films());
        let err = store
            .update(&Patch::new().set("director", "Scott"), &Filter::new())
            .unwrap_err();
        assert!(matches!(err, RelationError::IncompatibleSchema { .. }));
    }

    #[test]
    fn single_row_replaces_on_second_insert() {
        let mut store = SingleRow::new(films());
        assert!(store.current().is_none());

        store.insert(film("Alien", 1979)).unwrap();
        assert_eq!(store.len(), 1);

        store.insert(film("Aliens", 1986)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.current().unwrap().get_text("title").unwrap(),
            Some("Aliens")
        );
    }

    #[test]
    fn reads_do_not_mutate_the_receiver() {
        let mut store = Rows::new(films());
        store.insert(film("Alien", 1979)).unwrap();

        let snapshot = store.materialize();
        let _ = store.select(&Filter::new().with_eq("year", 1979i64)).unwrap();
        let _ = store.project(&["title"]).unwrap();
        assert_eq!(store.materialize(), snapshot);
    }
}
