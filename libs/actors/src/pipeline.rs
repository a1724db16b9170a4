//! Sequential pipeline orchestration
//!
//! A [`Pipeline`] is a declarative chain of fan-out rounds executed by one
//! ephemeral coordinator per invocation: the start step maps the initiating
//! request into the first round's requests, each intermediate step maps the
//! previous round's aggregated Success into the next round's requests, and
//! the end step maps the final aggregate into the Success delivered to the
//! original caller. Round k+1 never starts before round k is fully
//! collected, and any failure aborts the remaining rounds immediately. The
//! coordinator terminates on every path; the caller's own task only awaits
//! the final reply and is never blocked while rounds run.

use crate::gather::collect_round;
use crate::message::{Request, Response, Success};
use crate::registry::{ActorAddr, ActorName};
use crate::system::ActorSystem;
use crate::EngineError;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

type StartFn = Box<dyn Fn(&Request) -> Request + Send>;
type StepFn = Box<dyn Fn(&Success) -> Request + Send>;
type EndFn = Box<dyn FnOnce(Success) -> Success + Send>;

/// Builder for the intermediate and end steps of a pipeline.
pub struct PipelineBuilder {
    start: (Vec<ActorName>, StartFn),
    steps: Vec<(Vec<ActorName>, StepFn)>,
}

impl PipelineBuilder {
    /// Append an intermediate round: map the previous round's aggregate into
    /// the request sent to each of the given targets.
    pub fn then(
        mut self,
        targets: Vec<ActorName>,
        transform: impl Fn(&Success) -> Request + Send + 'static,
    ) -> Self {
        self.steps.push((targets, Box::new(transform)));
        self
    }

    /// Close the chain with the transform applied to the final aggregate.
    pub fn finish(self, end: impl FnOnce(Success) -> Success + Send + 'static) -> Pipeline {
        Pipeline {
            start: self.start,
            steps: self.steps,
            end: Box::new(end),
        }
    }
}

/// Declarative chain of {transform, fan out, await all, union} rounds.
pub struct Pipeline {
    start: (Vec<ActorName>, StartFn),
    steps: Vec<(Vec<ActorName>, StepFn)>,
    end: EndFn,
}

impl Pipeline {
    /// Begin a pipeline: map the initiating request into the request sent to
    /// each of the first round's targets.
    pub fn start(
        targets: Vec<ActorName>,
        transform: impl Fn(&Request) -> Request + Send + 'static,
    ) -> PipelineBuilder {
        PipelineBuilder {
            start: (targets, Box::new(transform)),
            steps: Vec::new(),
        }
    }

    /// Execute the pipeline on an ephemeral coordinator task.
    ///
    /// The timeout bounds the whole invocation. On expiry the caller gets a
    /// Timeout failure and the coordinator's eventual result is discarded —
    /// at most one outcome ever reaches the caller.
    pub async fn run(
        self,
        system: &ActorSystem,
        initial: Request,
        timeout: Duration,
    ) -> Response {
        let (reply, rx) = oneshot::channel();
        let system = system.clone();

        // One coordinator per invocation; it terminates unconditionally,
        // whether or not the caller is still listening.
        tokio::spawn(async move {
            let result = self.drive(&system, initial, timeout).await;
            if reply.send(result).is_err() {
                debug!("pipeline result dropped; caller gone");
            }
        });

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => Err(EngineError::unsupported("pipeline coordinator vanished")),
            Err(_) => Err(EngineError::Timeout { waited: timeout }),
        }
    }

    /// Walk the rounds in order, reusing the fan-out/fan-in collection.
    async fn drive(
        self,
        system: &ActorSystem,
        initial: Request,
        timeout: Duration,
    ) -> Response {
        let (targets, transform) = self.start;
        let addrs = resolve_targets(system, &targets).await?;
        let round: Vec<(ActorAddr, Request)> = addrs
            .into_iter()
            .map(|addr| {
                let request = transform(&initial);
                (addr, request)
            })
            .collect();
        let mut aggregate = collect_round(round, timeout).await?;
        debug!(round = 0usize, "pipeline round complete");

        for (index, (targets, transform)) in self.steps.into_iter().enumerate() {
            let addrs = resolve_targets(system, &targets).await?;
            let round: Vec<(ActorAddr, Request)> = addrs
                .into_iter()
                .map(|addr| {
                    let request = transform(&aggregate);
                    (addr, request)
                })
                .collect();
            aggregate = collect_round(round, timeout).await?;
            debug!(round = index + 1, "pipeline round complete");
        }

        Ok((self.end)(aggregate))
    }
}

/// Resolve every target address up front; a resolution failure aborts the
/// round before anything is sent.
async fn resolve_targets(
    system: &ActorSystem,
    targets: &[ActorName],
) -> Result<Vec<ActorAddr>, EngineError> {
    let mut addrs = Vec::with_capacity(targets.len());
    for name in targets {
        addrs.push(system.lookup(name.kind(), name.id()).await?);
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_step_order() {
        let pipeline = Pipeline::start(vec![ActorName::new("shard", 1)], |_| Request::Load)
            .then(vec![ActorName::new("shard", 2)], |_| Request::Load)
            .then(vec![ActorName::new("shard", 3)], |_| Request::Load)
            .finish(|s| s);

        assert_eq!(pipeline.start.0, vec![ActorName::new("shard", 1)]);
        let step_targets: Vec<u64> = pipeline.steps.iter().map(|(t, _)| t[0].id()).collect();
        assert_eq!(step_targets, vec![2, 3]);
    }
}
