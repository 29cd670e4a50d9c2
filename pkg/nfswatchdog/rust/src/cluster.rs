// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Kubernetes side of the watchdog: the pod it acts on, how that pod is
//! looked up and deleted, and where Warning events go.

use std::fmt;
use std::future::Future;
use std::path::Path;

use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams};
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::{Client, Resource};
use log::info;

use crate::errors::{ClusterError, Error};

/// Namespace file mounted into every pod with a service account.
pub const SERVICE_ACCOUNT_NAMESPACE_PATH: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Reporting component shown on recorded events.
pub const EVENT_COMPONENT: &str = "NfsWatchdog";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodIdentity {
    pub namespace: String,
    pub name: String,
}

impl PodIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Read the pod's namespace from the service account mount.
pub fn resolve_namespace(path: &Path) -> Result<String, Error> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::NamespaceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let namespace = contents.trim();
    if namespace.is_empty() {
        return Err(Error::NamespaceEmpty(path.to_path_buf()));
    }
    Ok(namespace.to_string())
}

/// How dependents of a deleted pod are cleaned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The pod stays visible until its dependents are gone.
    Foreground,
}

impl Propagation {
    fn delete_params(self) -> DeleteParams {
        match self {
            Propagation::Foreground => DeleteParams::foreground(),
        }
    }
}

impl fmt::Display for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Propagation::Foreground => write!(f, "foreground"),
        }
    }
}

pub trait PodApi {
    fn get_pod(&self, pod: &PodIdentity) -> impl Future<Output = Result<Pod, ClusterError>> + Send;

    fn delete_pod(
        &self,
        pod: &PodIdentity,
        propagation: Propagation,
    ) -> impl Future<Output = Result<(), ClusterError>> + Send;
}

pub trait EventSink {
    fn record_warning(
        &self,
        pod: &Pod,
        reason: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), ClusterError>> + Send;
}

pub struct KubePodApi {
    client: Client,
}

impl KubePodApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

impl PodApi for KubePodApi {
    async fn get_pod(&self, pod: &PodIdentity) -> Result<Pod, ClusterError> {
        match self.pods(&pod.namespace).get(&pod.name).await {
            Ok(found) => Ok(found),
            Err(kube::Error::Api(response)) if response.code == 404 => {
                Err(ClusterError::NotFound(pod.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_pod(&self, pod: &PodIdentity, propagation: Propagation) -> Result<(), ClusterError> {
        self.pods(&pod.namespace)
            .delete(&pod.name, &propagation.delete_params())
            .await?;
        Ok(())
    }
}

/// Publishes events through the events.k8s.io API, logging each one first.
pub struct KubeEventSink {
    client: Client,
    reporter: Reporter,
}

impl KubeEventSink {
    pub fn new(client: Client, instance: Option<String>) -> Self {
        Self {
            client,
            reporter: Reporter {
                controller: EVENT_COMPONENT.to_string(),
                instance,
            },
        }
    }
}

impl EventSink for KubeEventSink {
    async fn record_warning(&self, pod: &Pod, reason: &str, message: &str) -> Result<(), ClusterError> {
        let reference = pod.object_ref(&());
        info!(
            "Event(Pod {}/{}): type: 'Warning' reason: '{reason}' {message}",
            reference.namespace.as_deref().unwrap_or_default(),
            reference.name.as_deref().unwrap_or_default(),
        );

        let recorder = Recorder::new(self.client.clone(), self.reporter.clone(), reference);
        recorder
            .publish(Event {
                type_: EventType::Warning,
                reason: reason.to_string(),
                note: Some(message.to_string()),
                action: "DeletePod".to_string(),
                secondary: None,
            })
            .await?;
        Ok(())
    }
}
