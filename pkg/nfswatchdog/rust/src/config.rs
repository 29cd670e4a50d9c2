// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::backoff::RetryPolicy;
use crate::errors::Error;

pub const DIRECTORY_VAR: &str = "watchdog_directory";
pub const POD_NAME_VAR: &str = "HOSTNAME";
pub const LOOP_SECONDS_VAR: &str = "watchdog_loop_seconds";
pub const INITIAL_BACKOFF_SECONDS_VAR: &str = "watchdog_initial_backoff_seconds";
pub const TIMEOUT_SECONDS_VAR: &str = "watchdog_timeout_seconds";
pub const ATTEMPT_TIMEOUT_SECONDS_VAR: &str = "watchdog_attempt_timeout_seconds";

const DEFAULT_LOOP_SECONDS: f64 = 5.0;
const DEFAULT_INITIAL_BACKOFF_SECONDS: f64 = 0.5;
const DEFAULT_TIMEOUT_SECONDS: f64 = 10.0;
const DEFAULT_ATTEMPT_TIMEOUT_SECONDS: f64 = 5.0;

/// Upper bound for every duration setting.
pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Startup settings, read once from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub directory: PathBuf,
    pub pod_name: String,
    pub check_interval: Duration,
    pub initial_backoff: Duration,
    pub timeout: Duration,
    /// Deadline for a single directory read. Never larger than `timeout`.
    pub attempt_timeout: Duration,
}

impl Config {
    /// Fails with every missing required variable named at once.
    pub fn from_env() -> Result<Self, Error> {
        let directory = required_var(DIRECTORY_VAR);
        let pod_name = required_var(POD_NAME_VAR);
        let missing: Vec<String> = [
            (DIRECTORY_VAR, directory.is_none()),
            (POD_NAME_VAR, pod_name.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| name.to_string())
        .collect();
        let (Some(directory), Some(pod_name)) = (directory, pod_name) else {
            return Err(Error::MissingEnvironment(missing));
        };

        let timeout = seconds_var(TIMEOUT_SECONDS_VAR, DEFAULT_TIMEOUT_SECONDS);
        let attempt_timeout =
            seconds_var(ATTEMPT_TIMEOUT_SECONDS_VAR, DEFAULT_ATTEMPT_TIMEOUT_SECONDS).min(timeout);

        Ok(Config {
            directory: PathBuf::from(directory),
            pod_name,
            check_interval: seconds_var(LOOP_SECONDS_VAR, DEFAULT_LOOP_SECONDS),
            initial_backoff: seconds_var(INITIAL_BACKOFF_SECONDS_VAR, DEFAULT_INITIAL_BACKOFF_SECONDS),
            timeout,
            attempt_timeout,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.initial_backoff, self.timeout)
    }
}

/// Unset and empty are the same thing here.
fn required_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Read a positive number of seconds, falling back to `default` when the
/// variable is unset or unusable. Values above [`MAX_DURATION`] are clamped.
fn seconds_var(name: &str, default: f64) -> Duration {
    let fallback = Duration::from_secs_f64(default);
    let Ok(raw) = env::var(name) else {
        return fallback;
    };
    match raw.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > MAX_DURATION.as_secs_f64() => {
            warn!("Clamping {name}={raw:?} to {MAX_DURATION:?}");
            MAX_DURATION
        }
        Ok(secs) if secs.is_finite() && secs > 0.0 => {
            Duration::try_from_secs_f64(secs).unwrap_or(fallback)
        }
        _ => {
            warn!("Ignoring invalid {name}={raw:?}, using {default}s");
            fallback
        }
    }
}

/// Agent-style level names; anything unrecognised means Info.
fn parse_log_level(level: &str) -> log::Level {
    match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "info" => log::Level::Info,
        "warn" | "warning" => log::Level::Warn,
        "error" | "critical" | "off" => log::Level::Error,
        _ => log::Level::Info,
    }
}

/// Priority: DD_LOG_LEVEL > LOG_LEVEL > default Info
pub fn get_log_level() -> log::Level {
    env::var("DD_LOG_LEVEL")
        .or_else(|_| env::var("LOG_LEVEL"))
        .map(|level| parse_log_level(&level))
        .unwrap_or(log::Level::Info)
}
