// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;

/// A failed read of the probe target, annotated with the path.
#[derive(Error, Debug)]
#[error("reading directory {}: {source}", .path.display())]
pub struct ProbeError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl ProbeError {
    pub fn new(path: PathBuf, source: io::Error) -> Self {
        Self { path, source }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn io_error(&self) -> &io::Error {
        &self.source
    }
}

/// One read-access check against the watched directory.
///
/// Implementations return the raw failure and leave its interpretation to
/// [`crate::classify::classify`].
pub trait Probe {
    fn target(&self) -> &Path;

    fn probe(&self) -> impl Future<Output = Result<(), ProbeError>> + Send;
}

type ReadFn = fn(&Path) -> io::Result<()>;

/// Lists a directory on the blocking pool, bounded by a per-attempt deadline.
#[derive(Debug, Clone)]
pub struct DirectoryProber {
    path: PathBuf,
    attempt_timeout: Duration,
    read: ReadFn,
}

impl DirectoryProber {
    pub fn new(path: PathBuf, attempt_timeout: Duration) -> Self {
        Self {
            path,
            attempt_timeout,
            read: read_access,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_read(mut self, read: ReadFn) -> Self {
        self.read = read;
        self
    }
}

impl Probe for DirectoryProber {
    fn target(&self) -> &Path {
        &self.path
    }

    async fn probe(&self) -> Result<(), ProbeError> {
        let path = self.path.clone();
        let read_fn = self.read;
        let read = tokio::task::spawn_blocking(move || read_fn(&path));
        bounded(self.attempt_timeout, read)
            .await
            .map_err(|source| ProbeError::new(self.path.clone(), source))
    }
}

/// Enumerate every entry of `path`, discarding them.
pub fn read_access(path: &Path) -> io::Result<()> {
    std::fs::read_dir(path)?.try_for_each(|entry| entry.map(|_| ()))
}

/// Wait for a blocking read for at most `limit`.
///
/// A read on a hung mount can block forever. On timeout the task is
/// abandoned on its blocking thread rather than cancelled.
async fn bounded(limit: Duration, read: JoinHandle<io::Result<()>>) -> io::Result<()> {
    match tokio::time::timeout(limit, read).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(io::Error::other(join_err)),
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no response within {limit:?}"),
        )),
    }
}
