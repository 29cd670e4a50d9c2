// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Watchdog for a network filesystem mounted into a pod.
//!
//! The directory is listed on a fixed interval. When every listing attempt
//! within the retry budget fails, a Warning event is recorded against the pod
//! and the pod is deleted so its controller schedules a replacement with a
//! fresh mount.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

pub mod backoff;
pub mod classify;
pub mod cluster;
pub mod config;
mod errors;
pub mod probe;
pub mod runtime;
pub mod watchdog;

#[cfg(test)]
pub(crate) mod test_utils;

pub use backoff::{ExponentialBackoff, RetryPolicy};
pub use classify::{Classification, classify};
pub use cluster::{EventSink, KubeEventSink, KubePodApi, PodApi, PodIdentity, Propagation};
pub use config::Config;
pub use errors::{ClusterError, Error};
pub use probe::{DirectoryProber, Probe};
pub use watchdog::{CycleOutcome, Exit, Watchdog};
