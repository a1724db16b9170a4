//! Error types for the relational data model
//!
//! Every schema, column, or type violation surfaces as
//! [`RelationError::IncompatibleSchema`]; a delete of an absent record
//! surfaces as [`RelationError::RecordNotFound`]. Errors are plain values:
//! they are returned through `Result` and translated into protocol failures
//! at the actor boundary, never thrown across it.

use thiserror::Error;

/// Errors raised by relation and record operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelationError {
    /// A record, predicate, projection, or update referenced columns outside
    /// or mismatched with the relation's schema.
    #[error("incompatible schema: {detail}")]
    IncompatibleSchema { detail: String },

    /// Delete targeted a record that is not present in the relation.
    #[error("record not found in relation '{relation}'")]
    RecordNotFound { relation: String },
}

impl RelationError {
    pub(crate) fn incompatible(detail: impl Into<String>) -> Self {
        Self::IncompatibleSchema {
            detail: detail.into(),
        }
    }

    pub(crate) fn not_found(relation: impl Into<String>) -> Self {
        Self::RecordNotFound {
            relation: relation.into(),
        }
    }
}
