//! dnsdock watchdog - keeps a dnsdock sidecar honest.
//!
//! dnsdock publishes a DNS name for every container carrying a
//! `DNSDOCK_ALIAS=<name>` environment variable. When dnsdock drifts out of
//! sync with Docker those names stop resolving. This crate periodically
//! resolves every published alias and restarts dnsdock as soon as one fails.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       dnsdock-watchdog                          │
//! │                                                                 │
//! │  ┌──────────────────┐    ┌──────────────────┐                  │
//! │  │ Docker Runtime   │───▶│   Reconciler     │                  │
//! │  │ (list, restart)  │    │  (fail-fast)     │                  │
//! │  └──────────────────┘    └────────┬─────────┘                  │
//! │         ▲                         │ resolve alias               │
//! │         │ restart dnsdock         ▼                             │
//! │         │                    ┌──────────────────┐              │
//! │         │                    │  Hickory         │──▶ UDP/TCP   │
//! │         └────────────────────│  Resolver        │    :53       │
//! │                              └──────────────────┘              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dnsdock_watchdog::{Config, DockerRuntime, HickoryResolver, Watchdog};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     let runtime = DockerRuntime::connect(&config.docker_host).unwrap();
//!     let resolver = HickoryResolver::new(&config.dns_resolvers, config.dns_timeout());
//!
//!     let watchdog = Watchdog::new(
//!         Arc::new(runtime),
//!         Arc::new(resolver),
//!         config.dnsdock_container_name.clone(),
//!         config.restart_interval(),
//!     );
//!     watchdog.run(CancellationToken::new()).await.unwrap();
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod docker;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod reconciler;
pub mod resolver;
pub mod telemetry;
pub mod watchdog;

// Re-export main types
pub use config::{Config, TelemetryConfig};
pub use docker::DockerRuntime;
pub use error::{EnvVarError, ResolveFailure, WatchdogError};
pub use inventory::{ContainerRecord, ContainerRuntime};
pub use reconciler::{reconcile, Decision};
pub use resolver::{AliasResolver, HickoryResolver};
pub use watchdog::{PassReport, Watchdog};
