//! Engine error taxonomy
//!
//! One error enum for the whole runtime: addressing, generic inserts,
//! aggregation, and timeouts. Relation-level errors are wrapped via `#[from]`
//! and travel inside protocol Failure replies; they never kill an actor task.

use relation::RelationError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the actor runtime and its orchestration primitives.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// An actor with the same (kind, id) identity already exists.
    #[error("naming conflict: actor '{name}' already exists")]
    NamingConflict { name: String },

    /// No actor registered under the given (kind, id) identity.
    #[error("actor '{name}' not found")]
    ActorNotFound { name: String },

    /// Generic insert addressed a relation name the actor does not own.
    #[error("relation '{relation}' not found")]
    RelationNotFound { relation: String },

    /// A relation operation failed; surfaced as a protocol Failure.
    #[error(transparent)]
    Relation(#[from] RelationError),

    /// A fan-out/fan-in or pipeline round failed; wraps the first cause.
    #[error("aggregation failed: {cause}")]
    Aggregation { cause: Box<EngineError> },

    /// A bounded wait on responses expired.
    #[error("operation timed out after {waited:?}")]
    Timeout { waited: Duration },

    /// The target actor terminated before replying.
    #[error("mailbox closed for actor '{name}'")]
    MailboxClosed { name: String },

    /// The request is not part of the receiving actor's protocol, or the
    /// operation's inputs make no sense (for example, an empty fan-out).
    #[error("unsupported request: {detail}")]
    Unsupported { detail: String },

    /// Runtime configuration could not be parsed.
    #[error("invalid configuration: {detail}")]
    Config { detail: String },
}

impl EngineError {
    /// Wrap the first failure of an aggregation round.
    pub fn aggregation(cause: EngineError) -> Self {
        Self::Aggregation {
            cause: Box::new(cause),
        }
    }

    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::Unsupported {
            detail: detail.into(),
        }
    }
}
