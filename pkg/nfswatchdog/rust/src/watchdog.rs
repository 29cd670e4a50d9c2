// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! The check loop.
//!
//! Every tick runs one check cycle: the probe is retried with a fresh
//! backoff schedule until it succeeds or the cycle's time budget runs out.
//! Running out escalates: a Warning event is recorded on the pod (best
//! effort) and the pod is deleted with foreground propagation. After that
//! the loop is done for good; the replacement pod runs its own watchdog.

use std::future::Future;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::{Instant, MissedTickBehavior};

use crate::backoff::{self, RetryPolicy};
use crate::classify::{Classification, classify};
use crate::cluster::{EventSink, PodApi, PodIdentity, Propagation};
use crate::errors::{ClusterError, Error};
use crate::probe::Probe;

pub const EVENT_REASON: &str = "NfsWatchdogTimeout";
pub const EVENT_MESSAGE: &str = "Stale NFS mount detected, deleting pod";

#[derive(Debug)]
pub enum CycleOutcome {
    Healthy {
        attempts: u32,
    },
    /// `error` is always [`Error::MountCorrupted`]. `classification` comes
    /// from the last probe error and is informational only.
    Exhausted {
        error: Error,
        classification: Classification,
    },
}

/// Why [`Watchdog::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    PodDeleted,
    Shutdown,
}

pub struct Watchdog<P, C, E> {
    prober: P,
    pods: C,
    events: E,
    pod: PodIdentity,
    policy: RetryPolicy,
    check_interval: Duration,
}

impl<P, C, E> Watchdog<P, C, E>
where
    P: Probe,
    C: PodApi,
    E: EventSink,
{
    pub fn new(
        prober: P,
        pods: C,
        events: E,
        pod: PodIdentity,
        policy: RetryPolicy,
        check_interval: Duration,
    ) -> Self {
        Self {
            prober,
            pods,
            events,
            pod,
            policy,
            check_interval,
        }
    }

    /// Tick until the pod is deleted or `shutdown` resolves.
    ///
    /// `shutdown` is only observed between cycles. A failed deletion is
    /// returned as [`Error::PodDeletion`].
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<Exit, Error> {
        info!(
            "Starting Kubernetes Agent NFS Watchdog (directory={}, pod={}, interval={:?}, timeout={:?})",
            self.prober.target().display(),
            self.pod,
            self.check_interval,
            self.policy.max_elapsed_time,
        );

        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.check_interval, self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("NFS watchdog shutting down");
                    return Ok(Exit::Shutdown);
                }
                _ = ticker.tick() => {}
            }

            if let CycleOutcome::Exhausted { error, .. } = self.check().await {
                self.escalate(&error).await?;
                return Ok(Exit::PodDeleted);
            }
        }
    }

    /// One check cycle with its own backoff schedule.
    pub async fn check(&self) -> CycleOutcome {
        info!("Checking for read access...");
        let retried = backoff::retry(self.policy.start(), || self.prober.probe()).await;

        match retried.result {
            Ok(()) => {
                debug!(
                    "{} readable after {} attempt(s)",
                    self.prober.target().display(),
                    retried.attempts
                );
                CycleOutcome::Healthy {
                    attempts: retried.attempts,
                }
            }
            Err(last) => {
                let classification = classify(Some(&last));
                if !classification.is_corrupted() {
                    warn!("Last probe error is not a known stale mount signal, escalating anyway");
                }
                CycleOutcome::Exhausted {
                    error: Error::MountCorrupted {
                        path: self.prober.target().to_path_buf(),
                        attempts: retried.attempts,
                        elapsed: retried.elapsed,
                    },
                    classification,
                }
            }
        }
    }

    /// Record the event, then delete the pod. Only the deletion can fail.
    pub async fn escalate(&self, cause: &Error) -> Result<(), Error> {
        error!("{cause}, deleting pod {}", self.pod);

        if let Err(e) = self.raise_event().await {
            error!("Failed to record event on pod {}: {e}", self.pod);
        }

        self.pods
            .delete_pod(&self.pod, Propagation::Foreground)
            .await
            .map_err(|source| Error::PodDeletion {
                pod: self.pod.clone(),
                source,
            })?;

        info!("Deleted pod {}", self.pod);
        Ok(())
    }

    async fn raise_event(&self) -> Result<(), ClusterError> {
        let pod = self.pods.get_pod(&self.pod).await?;
        self.events
            .record_warning(&pod, EVENT_REASON, EVENT_MESSAGE)
            .await
    }
}
