//! Fan-out/fan-in request aggregation
//!
//! [`ask_all`] sends one request per target actor, waits for every response,
//! and unions the successful result relations into one aggregate. The
//! reduction is order-independent: responses are collected in arrival order
//! and bag union is commutative and associative, so the outcome never depends
//! on scheduling. Any failure resolves the whole operation to a single
//! aggregation failure carrying the first cause; partial successes are
//! discarded, and a response arriving after the shared timeout is never
//! delivered.

use crate::message::{Request, Response, Success};
use crate::registry::ActorAddr;
use crate::system::ActorSystem;
use crate::EngineError;
use futures::stream::{FuturesUnordered, StreamExt};
use relation::Relation;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Send each request to the correspondingly addressed actor of the given
/// kind, concurrently, and union all Success results.
///
/// Target resolution happens before any send: an unknown (kind, id) fails the
/// call with `ActorNotFound` without contacting anyone.
pub async fn ask_all(
    system: &ActorSystem,
    kind: &str,
    requests: HashMap<u64, Request>,
    timeout: Duration,
) -> Response {
    let mut targets = Vec::with_capacity(requests.len());
    for (id, request) in requests {
        targets.push((system.lookup(kind, id).await?, request));
    }
    collect_round(targets, timeout).await
}

/// One fan-out/fan-in round: send every (address, request) pair, await all
/// responses, union the results. Shared by [`ask_all`] and the pipeline
/// orchestrator.
pub(crate) async fn collect_round(
    targets: Vec<(ActorAddr, Request)>,
    timeout: Duration,
) -> Response {
    if targets.is_empty() {
        return Err(EngineError::unsupported(
            "fan-out requires at least one target",
        ));
    }
    let expected = targets.len();

    let mut pending: FuturesUnordered<_> = targets
        .into_iter()
        .map(|(addr, request)| async move { addr.ask(request, timeout).await })
        .collect();

    let collect = async {
        let mut aggregate: Option<Success> = None;
        while let Some(response) = pending.next().await {
            let success = response.map_err(EngineError::aggregation)?;
            aggregate = Some(match aggregate {
                None => success,
                Some(acc) => combine(acc, success)?,
            });
        }
        // targets is non-empty, so the loop produced at least one success
        aggregate.ok_or_else(|| EngineError::unsupported("no responses collected"))
    };

    match tokio::time::timeout(timeout, collect).await {
        Ok(result) => {
            if result.is_ok() {
                debug!(responses = expected, "fan-in complete");
            }
            result
        }
        // pending futures are dropped here; late responses go nowhere
        Err(_) => Err(EngineError::Timeout { waited: timeout }),
    }
}

/// Union two aggregated successes. A schema mismatch between actors, or a
/// reply outside the row-carrying family, is a fatal aggregation error.
fn combine(acc: Success, next: Success) -> Result<Success, EngineError> {
    match (acc, next) {
        (Success::Rows(a), Success::Rows(b)) => {
            let unioned = a
                .union(&b)
                .map_err(|e| EngineError::aggregation(e.into()))?;
            Ok(Success::Rows(unioned))
        }
        (Success::Count(a), Success::Count(b)) => Ok(Success::Count(a + b)),
        (Success::Ack, Success::Ack) => Ok(Success::Ack),
        _ => Err(EngineError::aggregation(EngineError::unsupported(
            "mixed response kinds in one aggregation round",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_acks_combine_homogeneously() {
        assert_eq!(
            combine(Success::Count(2), Success::Count(3)).unwrap(),
            Success::Count(5)
        );
        assert_eq!(combine(Success::Ack, Success::Ack).unwrap(), Success::Ack);
        assert!(combine(Success::Ack, Success::Count(1)).is_err());
    }
}
