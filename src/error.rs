//! Error types for dnsdock-watchdog.

use thiserror::Error;

/// Errors that end the watchdog loop.
#[derive(Debug, Error)]
pub enum WatchdogError {
    /// IO error (signals, sockets).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Docker API error while listing or inspecting containers.
    #[error("Docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// Failed to load configuration from the environment.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The sidecar container is not among the running containers.
    #[error("Sidecar container '{0}' not found among running containers")]
    SidecarNotFound(String),

    /// Restarting the sidecar failed.
    #[error("Failed to restart container '{name}': {reason}")]
    Restart {
        /// Container name.
        name: String,
        /// Reason for failure.
        reason: String,
    },
}

/// Why an alias could not be resolved.
///
/// Every variant is recoverable: it marks the pass as needing a restart and
/// the next pass runs on schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveFailure {
    /// The name does not exist.
    #[error("NXDOMAIN for {0}")]
    NxDomain(String),

    /// The name exists but the answer section was empty.
    #[error("no answer for {0}")]
    NoAnswer(String),

    /// No nameserver replied in time.
    #[error("timed out resolving {0}")]
    Timeout(String),

    /// A configured nameserver address could not be parsed.
    #[error("resolver misconfigured: {0}")]
    Misconfigured(String),

    /// Any other resolver error.
    #[error("resolution failed: {0}")]
    Other(String),
}

/// Errors parsing a `KEY=VALUE` environment entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvVarError {
    /// The entry has no `=`.
    #[error("environment entry '{0}' has no '=' separator")]
    MissingSeparator(String),
}
