//! Actor behavior trait
//!
//! An actor owns a [`StoreSet`] and interprets operation-specific requests.
//! The runtime drives the mailbox loop and handles the generic protocol
//! itself: `Insert` goes through the store fallback, `Load` through
//! [`Actor::on_load`], and only `Custom` payloads reach [`Actor::handle`].
//! Whatever the handler returns becomes the single reply — an actor can fail
//! a request, but it cannot drop one.

use crate::message::Response;
use crate::store::StoreSet;
use crate::EngineError;
use async_trait::async_trait;
use std::any::Any;

/// Behavior of one addressable actor.
#[async_trait]
pub trait Actor: Send + 'static {
    /// The relation stores this actor owns, fixed at construction.
    fn stores(&mut self) -> &mut StoreSet;

    /// Handle an operation-specific request payload.
    ///
    /// Handlers downcast the payload with [`crate::message::expect_request`]
    /// and reply with that operation's Success or Failure; an unrecognized
    /// payload is answered with an `Unsupported` failure, never silence.
    async fn handle(&mut self, payload: Box<dyn Any + Send>) -> Response;

    /// Called once before the actor starts receiving messages. An error
    /// aborts the spawn and the actor is never registered.
    async fn on_start(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Handle the bootstrap load command. The default acknowledges without
    /// loading anything.
    async fn on_load(&mut self) -> Response {
        Ok(crate::message::Success::Ack)
    }

    /// Called after the mailbox closes, before the task ends.
    async fn on_stop(&mut self) {}
}
