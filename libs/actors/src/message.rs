//! Protocol message convention
//!
//! Every distributed operation is a closed Request / Success / Failure
//! family: a [`Request`] always travels inside an [`Envelope`] carrying the
//! reply channel its sender is awaiting, and the runtime answers every
//! envelope with exactly one [`Response`] — `Ok` for Success, `Err` for
//! Failure, never both, never neither. This uniformity is what lets the
//! fan-out aggregator and the pipeline orchestrator be written once against
//! any operation family.

use crate::EngineError;
use relation::{Record, Transient};
use std::any::Any;
use std::fmt;
use tokio::sync::oneshot;

/// The Success half of a protocol response.
#[derive(Debug, Clone, PartialEq)]
pub enum Success {
    /// Result rows of a query-style operation.
    Rows(Transient),
    /// Affected-row count of a mutation-style operation.
    Count(usize),
    /// Plain acknowledgement (load and lifecycle commands).
    Ack,
}

/// Exactly one of Success or Failure.
pub type Response = Result<Success, EngineError>;

/// Generic name-addressed insert understood by every actor.
#[derive(Debug, Clone)]
pub struct InsertRequest {
    /// Name of the target relation within the receiving actor.
    pub relation: String,
    pub records: Vec<Record>,
}

/// A request an actor can receive.
pub enum Request {
    /// Insert records into a named relation; dispatched by the runtime's
    /// generic fallback against the actor's own stores.
    Insert(InsertRequest),
    /// Load-your-data command from the bootstrap collaborator; acknowledged
    /// with [`Success::Ack`].
    Load,
    /// Operation-specific payload interpreted by the actor's own handler.
    Custom(Box<dyn Any + Send>),
}

impl Request {
    /// Wrap an operation-specific payload.
    pub fn custom<T: Any + Send>(payload: T) -> Self {
        Self::Custom(Box::new(payload))
    }

    /// Generic insert into the named relation.
    pub fn insert(relation: impl Into<String>, records: Vec<Record>) -> Self {
        Self::Insert(InsertRequest {
            relation: relation.into(),
            records,
        })
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Insert(req) => f
                .debug_struct("Insert")
                .field("relation", &req.relation)
                .field("records", &req.records.len())
                .finish(),
            Request::Load => write!(f, "Load"),
            Request::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Downcast a custom payload to the operation type an actor expects.
///
/// Returns an `Unsupported` failure when the payload is of a different
/// operation family, so handlers can end a `match` chain with it.
pub fn expect_request<T: Any>(payload: Box<dyn Any + Send>) -> Result<T, EngineError> {
    payload.downcast::<T>().map(|b| *b).map_err(|_| {
        EngineError::unsupported(format!(
            "payload is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

/// One request plus the single reply channel its sender is awaiting.
pub struct Envelope {
    pub(crate) request: Request,
    pub(crate) reply: oneshot::Sender<Response>,
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("request", &self.request)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct FindByYear {
        year: i64,
    }

    #[test]
    fn custom_payload_round_trips_through_downcast() {
        let request = Request::custom(FindByYear { year: 1979 });
        let Request::Custom(payload) = request else {
            panic!("expected custom request");
        };
        let op: FindByYear = expect_request(payload).unwrap();
        assert_eq!(op, FindByYear { year: 1979 });
    }

    #[test]
    fn foreign_payload_is_unsupported() {
        let err = expect_request::<FindByYear>(Box::new("wrong")).unwrap_err();
        assert!(matches!(err, EngineError::Unsupported { .. }));
    }
}
