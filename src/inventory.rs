//! Container inventory: the records the reconciler reads and the runtime
//! trait that supplies them.
//!
//! Aliases are published to dnsdock through environment variables:
//!
//! ```text
//! DNSDOCK_ALIAS=web.local
//!   → resolve web.local
//!   → expected to answer with one of the container's network IPs
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{EnvVarError, WatchdogError};

/// Key prefix marking the environment entry that carries a dnsdock alias.
pub const ALIAS_MARKER: &str = "DNSDOCK_ALIAS";

/// A running container as seen by one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    /// Runtime handle used for restarts.
    pub id: String,
    /// Container name, without Docker's leading `/`.
    pub name: String,
    /// Environment entries in `KEY=VALUE` form, in container order.
    pub env: Vec<String>,
    /// Network name -> IP address assigned on that network.
    pub networks: HashMap<String, String>,
}

impl ContainerRecord {
    /// Create a record with no environment and no networks.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            env: Vec::new(),
            networks: HashMap::new(),
        }
    }

    /// Append an environment entry.
    pub fn with_env(mut self, entry: impl Into<String>) -> Self {
        self.env.push(entry.into());
        self
    }

    /// Attach the container to a network with the given IP.
    pub fn with_network(mut self, network: impl Into<String>, ip: impl Into<String>) -> Self {
        self.networks.insert(network.into(), ip.into());
        self
    }

    /// The dnsdock alias this container publishes, if any.
    pub fn alias(&self) -> Option<String> {
        extract_alias(&self.env)
    }

    /// The IP address the alias is expected to resolve to, if any.
    pub fn address(&self) -> Option<String> {
        extract_address(&self.networks)
    }
}

/// A parsed `KEY=VALUE` environment entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    /// Everything before the first `=`.
    pub key: String,
    /// Everything after the first `=`; may itself contain `=`.
    pub value: String,
}

impl FromStr for EnvVar {
    type Err = EnvVarError;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| EnvVarError::MissingSeparator(entry.to_string()))?;

        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Extract the dnsdock alias from a container's environment.
///
/// Matches entries whose key starts with [`ALIAS_MARKER`]; when several match,
/// the last one wins. An empty value counts as no alias, even when an earlier
/// match is non-empty. Entries without `=` are skipped.
pub fn extract_alias<S: AsRef<str>>(env: &[S]) -> Option<String> {
    env.iter()
        .filter_map(|entry| match entry.as_ref().parse::<EnvVar>() {
            Ok(var) => Some(var),
            Err(e) => {
                debug!(error = %e, "skipping malformed environment entry");
                None
            }
        })
        .filter(|var| var.key.starts_with(ALIAS_MARKER))
        .last()
        .map(|var| var.value)
        .filter(|value| !value.is_empty())
}

/// Extract the IP of an arbitrary attached network.
///
/// Map iteration order decides which network wins when there are several.
pub fn extract_address(networks: &HashMap<String, String>) -> Option<String> {
    networks.values().next().cloned()
}

/// Source of running containers and the ability to restart one.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List running containers with their environment and network addresses.
    async fn list_running(&self) -> Result<Vec<ContainerRecord>, WatchdogError>;

    /// Restart the given container, blocking until the runtime reports completion.
    async fn restart(&self, container: &ContainerRecord) -> Result<(), WatchdogError>;
}
