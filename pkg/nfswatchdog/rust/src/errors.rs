// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::cluster::PodIdentity;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not start, missing environment variable(s): {}", .0.join(", "))]
    MissingEnvironment(Vec<String>),

    #[error("could not read namespace from {}: {source}", .path.display())]
    NamespaceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("namespace file {} is empty", .0.display())]
    NamespaceEmpty(PathBuf),

    /// A check cycle ran out of budget. The raw probe error is logged by the
    /// classifier, not carried here.
    #[error(
        "filesystem at {} is corrupted: no successful read after {attempts} attempt(s) in {elapsed:?}",
        .path.display()
    )]
    MountCorrupted {
        path: PathBuf,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("failed to delete pod {pod}: {source}")]
    PodDeletion {
        pod: PodIdentity,
        #[source]
        source: ClusterError,
    },
}

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("pod {0} not found")]
    NotFound(PodIdentity),

    #[error(transparent)]
    Api(#[from] kube::Error),
}
