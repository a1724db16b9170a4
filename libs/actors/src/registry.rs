//! Actor addressing and registry
//!
//! Actors are addressed by [`ActorName`]: a declared kind plus a numeric id,
//! rendered as `kind#id`. That derived string is the registry key, so the
//! same id may be reused across kinds while a (kind, id) pair stays unique.
//! The registry is the only shared mutable state in the runtime; creation and
//! lookup are safe under concurrency and a duplicate name is reported as a
//! conflict rather than silently overwriting the existing actor.

use crate::message::{Envelope, Request, Response};
use crate::EngineError;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;

/// Deterministic actor identity: (declared kind, numeric id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorName {
    kind: String,
    id: u64,
}

impl ActorName {
    pub fn new(kind: impl Into<String>, id: u64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for ActorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Cheaply cloneable address of a running actor.
#[derive(Debug, Clone)]
pub struct ActorAddr {
    name: ActorName,
    tx: mpsc::Sender<Envelope>,
}

impl ActorAddr {
    pub(crate) fn new(name: ActorName, tx: mpsc::Sender<Envelope>) -> Self {
        Self { name, tx }
    }

    pub fn name(&self) -> &ActorName {
        &self.name
    }

    /// Send a request and await its single reply, bounded by the timeout.
    ///
    /// On expiry the reply channel is dropped, so a late response is
    /// discarded: the caller observes at most one outcome.
    pub async fn ask(&self, request: Request, timeout: Duration) -> Response {
        let (reply, rx) = oneshot::channel();
        let envelope = Envelope { request, reply };
        if self.tx.send(envelope).await.is_err() {
            return Err(EngineError::MailboxClosed {
                name: self.name.to_string(),
            });
        }
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => Err(EngineError::MailboxClosed {
                name: self.name.to_string(),
            }),
            Err(_) => Err(EngineError::Timeout { waited: timeout }),
        }
    }
}

pub(crate) struct RegisteredActor {
    pub(crate) addr: ActorAddr,
    pub(crate) task: JoinHandle<()>,
    /// Signals the mailbox loop to drain and terminate.
    pub(crate) stop: oneshot::Sender<()>,
}

/// Name-to-address registry shared by the whole system.
#[derive(Default)]
pub(crate) struct Registry {
    actors: RwLock<HashMap<String, RegisteredActor>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn contains(&self, name: &ActorName) -> bool {
        self.actors.read().await.contains_key(&name.to_string())
    }

    /// Register an actor under its derived name.
    ///
    /// A duplicate name is a conflict; the existing actor is untouched.
    pub(crate) async fn register(&self, entry: RegisteredActor) -> Result<(), EngineError> {
        let key = entry.addr.name().to_string();
        let mut actors = self.actors.write().await;
        if actors.contains_key(&key) {
            return Err(EngineError::NamingConflict { name: key });
        }
        actors.insert(key, entry);
        Ok(())
    }

    pub(crate) async fn lookup(&self, name: &ActorName) -> Result<ActorAddr, EngineError> {
        self.actors
            .read()
            .await
            .get(&name.to_string())
            .map(|entry| entry.addr.clone())
            .ok_or_else(|| EngineError::ActorNotFound {
                name: name.to_string(),
            })
    }

    pub(crate) async fn remove(&self, name: &ActorName) -> Option<RegisteredActor> {
        self.actors.write().await.remove(&name.to_string())
    }

    pub(crate) async fn drain(&self) -> Vec<RegisteredActor> {
        self.actors
            .write()
            .await
            .drain()
            .map(|(_, entry)| entry)
            .collect()
    }

    pub(crate) async fn len(&self) -> usize {
        self.actors.read().await.len()
    }
}
