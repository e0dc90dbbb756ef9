//! Docker implementation of [`ContainerRuntime`] via bollard.

use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions, RestartContainerOptions};
use bollard::models::ContainerInspectResponse;
use bollard::{Docker, API_DEFAULT_VERSION};
use tracing::{debug, info};

use crate::error::WatchdogError;
use crate::inventory::{ContainerRecord, ContainerRuntime};

/// Request timeout for the Docker API, in seconds.
const DOCKER_TIMEOUT_SECS: u64 = 120;

/// Container runtime backed by a Docker Engine API endpoint.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the endpoint named by a `DOCKER_HOST`-style URL.
    ///
    /// Connection is lazy; an unreachable daemon surfaces on the first call.
    pub fn connect(docker_host: &str) -> Result<Self, WatchdogError> {
        let docker = if let Some(path) = socket_path(docker_host) {
            Docker::connect_with_socket(&path, DOCKER_TIMEOUT_SECS, API_DEFAULT_VERSION)?
        } else if docker_host.starts_with("tcp://") || docker_host.starts_with("http://") {
            Docker::connect_with_http(docker_host, DOCKER_TIMEOUT_SECS, API_DEFAULT_VERSION)?
        } else {
            return Err(WatchdogError::Config(format!(
                "unsupported DOCKER_HOST scheme: {docker_host}"
            )));
        };

        info!(docker_host, "Docker client configured");
        Ok(Self { docker })
    }
}

/// Socket path for a `unix://` URL.
///
/// `unix://var/run/docker.sock` and `unix:///var/run/docker.sock` both map to
/// `/var/run/docker.sock`.
fn socket_path(docker_host: &str) -> Option<String> {
    let path = docker_host.strip_prefix("unix://")?;
    if path.starts_with('/') {
        Some(path.to_string())
    } else {
        Some(format!("/{path}"))
    }
}

/// Strip Docker's leading `/` from a container name.
fn container_name(raw: &str) -> String {
    raw.trim_start_matches('/').to_string()
}

/// Build a record from an inspect response.
fn record_from_inspect(id: &str, inspect: ContainerInspectResponse) -> ContainerRecord {
    let name = inspect
        .name
        .as_deref()
        .map(container_name)
        .unwrap_or_default();
    let env = inspect.config.and_then(|c| c.env).unwrap_or_default();
    let networks = inspect
        .network_settings
        .and_then(|s| s.networks)
        .unwrap_or_default()
        .into_iter()
        .map(|(network, endpoint)| (network, endpoint.ip_address.unwrap_or_default()))
        .collect();

    ContainerRecord {
        id: inspect.id.unwrap_or_else(|| id.to_string()),
        name,
        env,
        networks,
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_running(&self) -> Result<Vec<ContainerRecord>, WatchdogError> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };

        let summaries = self.docker.list_containers(Some(options)).await?;

        let mut records = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let Some(id) = summary.id else {
                continue;
            };
            let inspect = self
                .docker
                .inspect_container(&id, None::<InspectContainerOptions>)
                .await?;
            records.push(record_from_inspect(&id, inspect));
        }

        debug!(containers = records.len(), "listed running containers");
        Ok(records)
    }

    async fn restart(&self, container: &ContainerRecord) -> Result<(), WatchdogError> {
        self.docker
            .restart_container(&container.id, None::<RestartContainerOptions>)
            .await
            .map_err(|e| WatchdogError::Restart {
                name: container.name.clone(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{ContainerConfig, EndpointSettings, NetworkSettings};
    use std::collections::HashMap;

    #[test]
    fn test_socket_path_relative_and_absolute() {
        assert_eq!(
            socket_path("unix://var/run/docker.sock").as_deref(),
            Some("/var/run/docker.sock")
        );
        assert_eq!(
            socket_path("unix:///var/run/docker.sock").as_deref(),
            Some("/var/run/docker.sock")
        );
        assert_eq!(socket_path("tcp://127.0.0.1:2375"), None);
    }

    #[test]
    fn test_container_name_strips_slash() {
        assert_eq!(container_name("/mediastation_dnsdock_1"), "mediastation_dnsdock_1");
        assert_eq!(container_name("web"), "web");
    }

    #[test]
    fn test_connect_rejects_unknown_scheme() {
        let err = DockerRuntime::connect("ssh://host").unwrap_err();
        assert!(matches!(err, WatchdogError::Config(_)));
    }

    #[test]
    fn test_record_from_inspect() {
        let mut networks = HashMap::new();
        networks.insert(
            "frontend".to_string(),
            EndpointSettings {
                ip_address: Some("10.0.0.5".to_string()),
                ..Default::default()
            },
        );

        let inspect = ContainerInspectResponse {
            id: Some("abc123".to_string()),
            name: Some("/web".to_string()),
            config: Some(ContainerConfig {
                env: Some(vec!["DNSDOCK_ALIAS=web.local".to_string()]),
                ..Default::default()
            }),
            network_settings: Some(NetworkSettings {
                networks: Some(networks),
                ..Default::default()
            }),
            ..Default::default()
        };

        let record = record_from_inspect("abc123", inspect);
        assert_eq!(record.id, "abc123");
        assert_eq!(record.name, "web");
        assert_eq!(record.alias(), Some("web.local".to_string()));
        assert_eq!(record.address(), Some("10.0.0.5".to_string()));
    }

    #[test]
    fn test_record_from_sparse_inspect() {
        let record = record_from_inspect("abc123", ContainerInspectResponse::default());
        assert_eq!(record.id, "abc123");
        assert!(record.name.is_empty());
        assert!(record.env.is_empty());
        assert!(record.networks.is_empty());
    }
}
