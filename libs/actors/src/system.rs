//! Actor system core
//!
//! Lifecycle management and message dispatch. Each actor runs on its own
//! tokio task and processes one envelope to completion before taking the
//! next, so an actor never observes a torn intermediate state of its own
//! stores. Stop and shutdown signal the mailbox to drain, so in-flight
//! envelopes are answered and `on_stop` runs; abort is the fallback for a
//! handler that never yields.

use crate::actor::Actor;
use crate::config::SystemConfig;
use crate::message::{Envelope, Request, Success};
use crate::registry::{ActorAddr, ActorName, RegisteredActor, Registry};
use crate::EngineError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// System-wide counters.
#[derive(Debug, Default)]
pub struct SystemMetrics {
    pub actors_spawned: AtomicU64,
    pub actors_stopped: AtomicU64,
    pub messages_processed: AtomicU64,
}

impl SystemMetrics {
    fn record_message(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Core actor system managing identities, mailboxes, and task lifecycles.
#[derive(Clone)]
pub struct ActorSystem {
    registry: Arc<Registry>,
    metrics: Arc<SystemMetrics>,
    config: Arc<SystemConfig>,
}

impl ActorSystem {
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(mut config: SystemConfig) -> Self {
        // A directly constructed config can bypass from_toml validation.
        if config.mailbox_capacity == 0 {
            warn!("mailbox_capacity 0 clamped to 1");
            config.mailbox_capacity = 1;
        }
        info!(
            mailbox_capacity = config.mailbox_capacity,
            default_timeout_ms = config.default_timeout_ms,
            "creating actor system"
        );
        Self {
            registry: Arc::new(Registry::new()),
            metrics: Arc::new(SystemMetrics::default()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<SystemMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Create an actor of the given kind and numeric id.
    ///
    /// The derived name `kind#id` must be free: a duplicate identity is a
    /// naming conflict and the existing actor is left untouched. The actor's
    /// `on_start` runs before registration; its failure aborts the spawn.
    pub async fn spawn(
        &self,
        kind: &str,
        id: u64,
        mut actor: impl Actor,
    ) -> Result<ActorAddr, EngineError> {
        let name = ActorName::new(kind, id);

        // Cheap early check; the registry re-checks under its write lock.
        if self.registry.contains(&name).await {
            return Err(EngineError::NamingConflict {
                name: name.to_string(),
            });
        }

        actor.on_start().await.map_err(|e| {
            error!(actor = %name, error = %e, "actor failed to start");
            e
        })?;

        let (tx, rx) = mpsc::channel(self.config.mailbox_capacity);
        let (stop, stop_rx) = oneshot::channel();
        let addr = ActorAddr::new(name.clone(), tx);
        let task = ActorTask {
            name: name.clone(),
            actor,
            rx,
            stop: stop_rx,
            metrics: Arc::clone(&self.metrics),
        };
        let handle = tokio::spawn(task.run());

        let entry = RegisteredActor {
            addr: addr.clone(),
            task: handle,
            stop,
        };
        if let Err(conflict) = self.registry.register(entry).await {
            // Lost the race to a concurrent spawn of the same identity; the
            // dropped stop sender makes the loser's task drain and exit.
            warn!(actor = %name, "spawn raced with an existing registration");
            return Err(conflict);
        }

        self.metrics.actors_spawned.fetch_add(1, Ordering::Relaxed);
        debug!(actor = %name, "actor spawned");
        Ok(addr)
    }

    /// Resolve the address of an existing actor by (kind, id).
    pub async fn lookup(&self, kind: &str, id: u64) -> Result<ActorAddr, EngineError> {
        self.registry.lookup(&ActorName::new(kind, id)).await
    }

    /// Stop an actor. Terminal: the identity slot is freed and a new actor
    /// may reuse the numeric id afterwards.
    ///
    /// Signals the mailbox loop to drain, so queued envelopes are answered
    /// and `on_stop` runs before this returns. A task that is still running
    /// after the configured default timeout is aborted.
    pub async fn stop(&self, kind: &str, id: u64) -> Result<(), EngineError> {
        let name = ActorName::new(kind, id);
        let entry = self
            .registry
            .remove(&name)
            .await
            .ok_or_else(|| EngineError::ActorNotFound {
                name: name.to_string(),
            })?;

        let _ = entry.stop.send(());
        self.reap(&name, entry.task).await;
        self.metrics.actors_stopped.fetch_add(1, Ordering::Relaxed);
        info!(actor = %name, "actor stopped");
        Ok(())
    }

    /// Await a signalled task, aborting it if it outlives the grace period.
    async fn reap(&self, name: &ActorName, mut task: JoinHandle<()>) {
        match tokio::time::timeout(self.config.default_timeout(), &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if !e.is_cancelled() {
                    warn!(actor = %name, error = %e, "actor task ended abnormally");
                }
            }
            Err(_) => {
                warn!(actor = %name, "actor did not drain in time; aborting");
                task.abort();
                let _ = task.await;
            }
        }
    }

    /// Number of live actors.
    pub async fn actor_count(&self) -> usize {
        self.registry.len().await
    }

    /// Stop every actor: signal all mailboxes, then await each drain,
    /// aborting stragglers.
    pub async fn shutdown(&self) {
        let entries = self.registry.drain().await;
        info!(actors = entries.len(), "shutting down actor system");

        let mut tasks = Vec::with_capacity(entries.len());
        for entry in entries {
            let _ = entry.stop.send(());
            tasks.push((entry.addr.name().clone(), entry.task));
        }
        for (name, task) in tasks {
            self.reap(&name, task).await;
            self.metrics.actors_stopped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Mailbox loop for one actor.
struct ActorTask<A: Actor> {
    name: ActorName,
    actor: A,
    rx: mpsc::Receiver<Envelope>,
    stop: oneshot::Receiver<()>,
    metrics: Arc<SystemMetrics>,
}

impl<A: Actor> ActorTask<A> {
    async fn run(mut self) {
        debug!(actor = %self.name, "entering message loop");

        loop {
            tokio::select! {
                envelope = self.rx.recv() => match envelope {
                    Some(envelope) => self.process(envelope).await,
                    None => break,
                },
                // Fires on explicit stop/shutdown and when the registration
                // was dropped (lost spawn race).
                _ = &mut self.stop => {
                    self.rx.close();
                    while let Some(envelope) = self.rx.recv().await {
                        self.process(envelope).await;
                    }
                    break;
                }
            }
        }

        self.actor.on_stop().await;
        debug!(actor = %self.name, "message loop ended");
    }

    /// Answer one envelope; the in-flight request always runs to completion.
    async fn process(&mut self, Envelope { request, reply }: Envelope) {
        let start = Instant::now();
        let response = self.dispatch(request).await;
        self.metrics.record_message();

        if let Err(ref e) = response {
            debug!(
                actor = %self.name,
                error = %e,
                elapsed_us = start.elapsed().as_micros() as u64,
                "request answered with failure"
            );
        }
        // The caller may have timed out and dropped its receiver.
        if reply.send(response).is_err() {
            debug!(actor = %self.name, "reply dropped; caller gone");
        }
    }

    /// Route one request: generic protocol first, actor handler for the rest.
    /// Always produces exactly one response.
    async fn dispatch(&mut self, request: Request) -> crate::message::Response {
        match request {
            Request::Insert(req) => self
                .actor
                .stores()
                .insert_into(&req.relation, req.records)
                .map(Success::Count),
            Request::Load => self.actor.on_load().await,
            Request::Custom(payload) => self.actor.handle(payload).await,
        }
    }
}
