//! # Lattice Relational Data Model
//!
//! Typed columns, schemas, immutable records, and the relational algebra the
//! Lattice actor runtime builds on. Actors privately own mutable stores
//! ([`Rows`], [`SingleRow`]); everything that crosses an actor boundary is an
//! immutable, by-value [`Transient`] view.
//!
//! ## Design
//!
//! - **Value identity**: columns compare by (name, type); records compare
//!   pairwise by (column, value). Nothing compares by reference.
//! - **Reads never mutate**: `select`, `project`, `union`, and `materialize`
//!   all return fresh [`Transient`] views.
//! - **Errors are values**: every violation is a [`RelationError`] returned
//!   through `Result`, translated into a protocol failure at the actor
//!   boundary.
//!
//! ## Example
//!
//! ```
//! use relation::{ColumnDef, Filter, MutableRelation, Record, Relation, RelationDef, Rows};
//!
//! let films = RelationDef::new(
//!     "films",
//!     [ColumnDef::text("title").required(), ColumnDef::int("year")],
//! )?;
//!
//! let mut store = Rows::new(films.clone());
//! store.insert(
//!     Record::build(films).set("title", "Alien").set("year", 1979i64).finish()?,
//! )?;
//!
//! let hits = store.select(&Filter::new().with_eq("year", 1979i64))?;
//! assert_eq!(hits.len(), 1);
//! # Ok::<(), relation::RelationError>(())
//! ```

pub mod column;
pub mod error;
pub mod record;
pub mod relation;
pub mod schema;
pub mod value;

pub use column::{ColumnDef, ColumnDefault};
pub use error::RelationError;
pub use record::{Record, RecordBuilder};
pub use relation::{Filter, MutableRelation, Patch, Predicate, Relation, Rows, SingleRow, Transient};
pub use schema::RelationDef;
pub use value::{Value, ValueType};
