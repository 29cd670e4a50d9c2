// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::path::Path;

use anyhow::{Context, Result};
use kube::Client;
use log::info;
use nfs_watchdog::cluster::{SERVICE_ACCOUNT_NAMESPACE_PATH, resolve_namespace};
use nfs_watchdog::config::{self, Config};
use nfs_watchdog::{DirectoryProber, Exit, KubeEventSink, KubePodApi, PodIdentity, Watchdog, runtime};
use tokio::signal::unix::{SignalKind, signal};

fn main() -> Result<()> {
    simple_logger::init_with_level(config::get_log_level())?;

    let config = Config::from_env()?;
    runtime::block_on(run(config)).context("Failed to build tokio runtime")?
}

async fn run(config: Config) -> Result<()> {
    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let namespace = resolve_namespace(Path::new(SERVICE_ACCOUNT_NAMESPACE_PATH))?;
    let pod = PodIdentity::new(namespace, config.pod_name.clone());

    let watchdog = Watchdog::new(
        DirectoryProber::new(config.directory.clone(), config.attempt_timeout),
        KubePodApi::new(client.clone()),
        KubeEventSink::new(client, Some(config.pod_name.clone())),
        pod,
        config.retry_policy(),
        config.check_interval,
    );

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;
    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
    };

    match watchdog.run(shutdown).await? {
        Exit::PodDeleted => info!("Pod deleted, NFS watchdog exiting"),
        Exit::Shutdown => info!("NFS watchdog stopped"),
    }
    Ok(())
}
