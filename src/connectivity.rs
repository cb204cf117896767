//! Network reachability detection.
//!
//! [`probe_reachability`] periodically opens a TCP connection to the API host
//! and yields whether it succeeded. [`watch_connectivity`] restarts the
//! scheduler whenever that stream changes into "reachable", which is how a
//! loop stopped by `NotConnected` recovers.
//!
//! The first observed status is only a baseline; starting up online does not
//! count as a transition.

use std::time::Duration;

use futures::future::ready;
use futures::stream::{self, Stream, StreamExt};
use log::{debug, info};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::scheduler::ReviewScheduler;

/// Yield `()` for every change from unreachable to reachable
pub fn reachable_transitions<S>(statuses: S) -> impl Stream<Item = ()>
where
    S: Stream<Item = bool>,
{
    statuses
        .scan(None, |previous: &mut Option<bool>, reachable| {
            let became_reachable = *previous == Some(false) && reachable;
            *previous = Some(reachable);
            ready(Some(became_reachable))
        })
        .filter_map(|became_reachable| ready(became_reachable.then_some(())))
}

/// Probe `host` (a `host:port` pair) now and then every `interval`
pub fn probe_reachability(host: String, interval: Duration, timeout: Duration) -> impl Stream<Item = bool> {
    stream::unfold(true, move |first| {
        let host = host.clone();
        async move {
            if !first {
                tokio::time::sleep(interval).await;
            }
            let reachable = probe(&host, timeout).await;
            Some((reachable, false))
        }
    })
}

async fn probe(host: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(host)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!("Probe of {} failed: {}", host, e);
            false
        }
        Err(_) => {
            debug!("Probe of {} timed out", host);
            false
        }
    }
}

/// Restart `scheduler` on every transition into reachable.
///
/// Runs until the status stream ends or `cancel` fires.
pub async fn watch_connectivity<S>(statuses: S, scheduler: ReviewScheduler, cancel: CancellationToken)
where
    S: Stream<Item = bool>,
{
    let transitions = reachable_transitions(statuses);
    futures::pin_mut!(transitions);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Connectivity watcher cancelled");
                break;
            }
            next = transitions.next() => {
                match next {
                    Some(()) => {
                        debug!("Network path became reachable");
                        scheduler.restart();
                    }
                    None => {
                        debug!("Connectivity stream ended");
                        break;
                    }
                }
            }
        }
    }
}
