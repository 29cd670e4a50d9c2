// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! In-memory stand-ins for the prober and the cluster
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use nix::errno::Errno;

use crate::cluster::{EventSink, PodApi, PodIdentity, Propagation};
use crate::errors::ClusterError;
use crate::probe::{Probe, ProbeError};

/// How long [`stalled_read`] blocks.
pub const READ_STALL: Duration = Duration::from_secs(3);

/// A directory read that hangs like one on a dead mount.
pub fn stalled_read(_path: &Path) -> io::Result<()> {
    std::thread::sleep(READ_STALL);
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Ok,
    Os(Errno),
    TimedOut,
}

/// Replays `script`, then repeats `then` forever.
#[derive(Clone)]
pub struct ScriptedProber {
    target: PathBuf,
    script: Arc<Mutex<VecDeque<Step>>>,
    then: Step,
    calls: Arc<Mutex<u32>>,
}

impl ScriptedProber {
    pub fn new(script: impl IntoIterator<Item = Step>, then: Step) -> Self {
        Self {
            target: PathBuf::from("/mnt/nfs"),
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            then,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn always(step: Step) -> Self {
        Self::new([], step)
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

impl Probe for ScriptedProber {
    fn target(&self) -> &Path {
        &self.target
    }

    async fn probe(&self) -> Result<(), ProbeError> {
        *self.calls.lock().unwrap() += 1;
        let step = self.script.lock().unwrap().pop_front().unwrap_or(self.then);
        let source = match step {
            Step::Ok => return Ok(()),
            Step::Os(errno) => io::Error::from_raw_os_error(errno as i32),
            Step::TimedOut => io::Error::new(io::ErrorKind::TimedOut, "no response"),
        };
        Err(ProbeError::new(self.target.clone(), source))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub namespace: String,
    pub pod_name: String,
    pub reason: String,
    pub message: String,
}

#[derive(Default)]
struct ClusterState {
    pod_missing: bool,
    delete_fails: bool,
    lookups: u32,
    events: Vec<RecordedEvent>,
    deletions: Vec<(PodIdentity, Propagation)>,
}

/// Records every call; serves both `PodApi` and `EventSink`.
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_pod(self) -> Self {
        self.state.lock().unwrap().pod_missing = true;
        self
    }

    pub fn with_failing_delete(self) -> Self {
        self.state.lock().unwrap().delete_fails = true;
        self
    }

    pub fn lookups(&self) -> u32 {
        self.state.lock().unwrap().lookups
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn deletions(&self) -> Vec<(PodIdentity, Propagation)> {
        self.state.lock().unwrap().deletions.clone()
    }
}

impl PodApi for FakeCluster {
    async fn get_pod(&self, pod: &PodIdentity) -> Result<Pod, ClusterError> {
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;
        if state.pod_missing {
            return Err(ClusterError::NotFound(pod.clone()));
        }
        Ok(Pod {
            metadata: ObjectMeta {
                name: Some(pod.name.clone()),
                namespace: Some(pod.namespace.clone()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn delete_pod(&self, pod: &PodIdentity, propagation: Propagation) -> Result<(), ClusterError> {
        let mut state = self.state.lock().unwrap();
        if state.delete_fails {
            return Err(ClusterError::NotFound(pod.clone()));
        }
        state.deletions.push((pod.clone(), propagation));
        Ok(())
    }
}

impl EventSink for FakeCluster {
    async fn record_warning(&self, pod: &Pod, reason: &str, message: &str) -> Result<(), ClusterError> {
        self.state.lock().unwrap().events.push(RecordedEvent {
            namespace: pod.metadata.namespace.clone().unwrap_or_default(),
            pod_name: pod.metadata.name.clone().unwrap_or_default(),
            reason: reason.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}
