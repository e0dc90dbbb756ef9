//! Configuration types for dnsdock-watchdog.
//!
//! Everything comes from flat environment variables (`LOG_LEVEL`,
//! `DOCKER_HOST`, ...), optionally seeded from a `.env` file by the binary.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::WatchdogError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level filter (e.g., "info", "debug", "dnsdock_watchdog=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Docker API endpoint (`unix://...`, `tcp://...` or `http://...`).
    #[serde(default = "default_docker_host")]
    pub docker_host: String,

    /// Nameservers to query, `ip` or `ip:port`.
    /// Entries are not validated here; a bad entry fails at query time.
    #[serde(default = "default_dns_resolvers")]
    pub dns_resolvers: Vec<String>,

    /// Exact name of the dnsdock container to restart.
    #[serde(default = "default_dnsdock_container_name")]
    pub dnsdock_container_name: String,

    /// Seconds to sleep between reconciliation passes.
    #[serde(default = "default_restart_interval")]
    pub restart_interval: u64,

    /// Port for the Prometheus metrics endpoint.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Per-query resolver timeout in seconds.
    #[serde(default = "default_dns_timeout")]
    pub dns_timeout: u64,

    /// OTLP endpoint (e.g., "http://localhost:4317"). Only used with the `otel` feature.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

/// Telemetry configuration, derived from [`Config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter.
    pub log_level: String,

    /// Prometheus metrics exporter address.
    pub prometheus_addr: Option<SocketAddr>,

    /// OTLP endpoint for trace export.
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_docker_host() -> String {
    "unix://var/run/docker.sock".to_string()
}

fn default_dns_resolvers() -> Vec<String> {
    vec!["10.1.1.1".to_string()]
}

fn default_dnsdock_container_name() -> String {
    "mediastation_dnsdock_1".to_string()
}

fn default_restart_interval() -> u64 {
    30
}

fn default_metrics_port() -> u16 {
    9199
}

fn default_dns_timeout() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            docker_host: default_docker_host(),
            dns_resolvers: default_dns_resolvers(),
            dnsdock_container_name: default_dnsdock_container_name(),
            restart_interval: default_restart_interval(),
            metrics_port: default_metrics_port(),
            dns_timeout: default_dns_timeout(),
            otlp_endpoint: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, WatchdogError> {
        Self::load(None)
    }

    /// Load configuration from an explicit set of variables instead of the
    /// process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, WatchdogError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<config::Map<String, String>>();
        Self::load(Some(map))
    }

    fn load(source: Option<config::Map<String, String>>) -> Result<Self, WatchdogError> {
        let config: Config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .source(source)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("dns_resolvers"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the watchdog useless.
    pub fn validate(&self) -> Result<(), WatchdogError> {
        if self.restart_interval == 0 {
            return Err(WatchdogError::Config(
                "RESTART_INTERVAL must be greater than zero".to_string(),
            ));
        }
        if self.dnsdock_container_name.trim().is_empty() {
            return Err(WatchdogError::Config(
                "DNSDOCK_CONTAINER_NAME must not be empty".to_string(),
            ));
        }
        if self.dns_resolvers.iter().all(|r| r.trim().is_empty()) {
            return Err(WatchdogError::Config(
                "DNS_RESOLVERS must name at least one nameserver".to_string(),
            ));
        }
        Ok(())
    }

    /// Sleep between passes.
    pub fn restart_interval(&self) -> Duration {
        Duration::from_secs(self.restart_interval)
    }

    /// Resolver per-query timeout.
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout)
    }

    /// Telemetry settings; metrics listen on all interfaces.
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            log_level: self.log_level.clone(),
            prometheus_addr: Some(SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.metrics_port))),
            otlp_endpoint: self.otlp_endpoint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_environment_empty() {
        let config = Config::from_vars(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.docker_host, "unix://var/run/docker.sock");
        assert_eq!(config.dns_resolvers, vec!["10.1.1.1".to_string()]);
        assert_eq!(config.dnsdock_container_name, "mediastation_dnsdock_1");
        assert_eq!(config.restart_interval(), Duration::from_secs(30));
        assert_eq!(config.metrics_port, 9199);
        assert_eq!(config.dns_timeout(), Duration::from_secs(5));
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_vars([
            ("LOG_LEVEL", "debug"),
            ("DOCKER_HOST", "tcp://10.0.0.2:2375"),
            ("DNS_RESOLVERS", "10.1.1.1,10.1.1.2:5353"),
            ("DNSDOCK_CONTAINER_NAME", "dnsdock"),
            ("RESTART_INTERVAL", "5"),
            ("METRICS_PORT", "9300"),
        ])
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.docker_host, "tcp://10.0.0.2:2375");
        assert_eq!(
            config.dns_resolvers,
            vec!["10.1.1.1".to_string(), "10.1.1.2:5353".to_string()]
        );
        assert_eq!(config.dnsdock_container_name, "dnsdock");
        assert_eq!(config.restart_interval(), Duration::from_secs(5));
        assert_eq!(config.metrics_port, 9300);
    }

    #[test]
    fn test_single_resolver_parses_as_list() {
        let config = Config::from_vars([("DNS_RESOLVERS", "192.168.1.1")]).unwrap();
        assert_eq!(config.dns_resolvers, vec!["192.168.1.1".to_string()]);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = Config::from_vars([("RESTART_INTERVAL", "0")]).unwrap_err();
        assert!(matches!(err, WatchdogError::Config(_)));
    }

    #[test]
    fn test_empty_container_name_rejected() {
        let config = Config {
            dnsdock_container_name: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_telemetry_uses_metrics_port() {
        let config = Config::default();
        let telemetry = config.telemetry();
        assert_eq!(
            telemetry.prometheus_addr,
            Some("0.0.0.0:9199".parse().unwrap())
        );
        assert_eq!(telemetry.log_level, "info");
    }
}
