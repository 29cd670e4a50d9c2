// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Exponential backoff bounded by total elapsed time.
//!
//! The shape follows the common convention: each wait is the current
//! interval randomized by `±randomization_factor`, the interval then grows by
//! `multiplier` up to `max_interval`, and the schedule stops once elapsed time
//! plus the next wait would overrun `max_elapsed_time`.

use std::future::Future;
use std::time::Duration;

use log::debug;
use rand::Rng;
use tokio::time::Instant;

pub const DEFAULT_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(60);

/// Immutable shape of one check cycle's retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_elapsed_time: Duration,
    pub multiplier: f64,
    pub randomization_factor: f64,
    pub max_interval: Duration,
}

impl RetryPolicy {
    pub fn new(initial_interval: Duration, max_elapsed_time: Duration) -> Self {
        Self {
            initial_interval,
            max_elapsed_time,
            multiplier: DEFAULT_MULTIPLIER,
            randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }

    pub fn with_randomization_factor(mut self, factor: f64) -> Self {
        self.randomization_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Start a fresh schedule. The elapsed-time clock starts now.
    pub fn start(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            policy: *self,
            current_interval: self.initial_interval.min(self.max_interval),
            started: Instant::now(),
        }
    }
}

#[derive(Debug)]
pub struct ExponentialBackoff {
    policy: RetryPolicy,
    current_interval: Duration,
    started: Instant,
}

impl ExponentialBackoff {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The next wait, or `None` when the budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        let elapsed = self.elapsed();
        let next = randomize(self.current_interval, self.policy.randomization_factor);
        self.increment_interval();
        if elapsed.saturating_add(next) > self.policy.max_elapsed_time {
            return None;
        }
        Some(next)
    }

    fn increment_interval(&mut self) {
        let max = self.policy.max_interval;
        if self.current_interval.as_secs_f64() >= max.as_secs_f64() / self.policy.multiplier {
            self.current_interval = max;
        } else {
            self.current_interval = self.current_interval.mul_f64(self.policy.multiplier);
        }
    }
}

fn randomize(interval: Duration, factor: f64) -> Duration {
    if factor <= 0.0 {
        return interval;
    }
    let secs = interval.as_secs_f64();
    let delta = factor * secs;
    let low = secs - delta;
    let high = secs + delta;
    if high <= low {
        return interval;
    }
    Duration::try_from_secs_f64(rand::thread_rng().gen_range(low..=high)).unwrap_or(interval)
}

/// Result of driving an operation through one backoff schedule.
#[derive(Debug)]
pub struct Retried<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Run `op` until it succeeds or `backoff` is spent. `op` always runs at
/// least once; only the last error is kept.
pub async fn retry<F, Fut, T, E>(mut backoff: ExponentialBackoff, mut op: F) -> Retried<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match op().await {
            Ok(value) => {
                return Retried {
                    result: Ok(value),
                    attempts,
                    elapsed: backoff.elapsed(),
                };
            }
            Err(err) => match backoff.next_backoff() {
                Some(wait) => {
                    debug!("attempt {attempts} failed: {err}, retrying in {wait:?}");
                    tokio::time::sleep(wait).await;
                }
                None => {
                    return Retried {
                        result: Err(err),
                        attempts,
                        elapsed: backoff.elapsed(),
                    };
                }
            },
        }
    }
}
