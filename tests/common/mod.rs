//! Shared test infrastructure: in-memory container runtime and resolver.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use dnsdock_watchdog::{
    AliasResolver, ContainerRecord, ContainerRuntime, ResolveFailure, Watchdog, WatchdogError,
};

// --- Constants ---

pub const SIDECAR: &str = "dnsdock";
pub const INTERVAL: Duration = Duration::from_secs(30);

// --- Container builders ---

pub fn sidecar() -> ContainerRecord {
    ContainerRecord::new("dnsdock-id", SIDECAR).with_network("bridge", "172.17.0.2")
}

pub fn app(name: &str, alias: &str, ip: &str) -> ContainerRecord {
    ContainerRecord::new(format!("{name}-id"), name)
        .with_env("PATH=/usr/local/bin:/usr/bin")
        .with_env(format!("DNSDOCK_ALIAS={alias}"))
        .with_network("frontend", ip)
}

pub fn plain(name: &str) -> ContainerRecord {
    ContainerRecord::new(format!("{name}-id"), name).with_env("PATH=/usr/bin")
}

// --- FakeRuntime ---

/// Serves a fixed inventory and records restarts.
#[derive(Default)]
pub struct FakeRuntime {
    containers: Mutex<Vec<ContainerRecord>>,
    restarted: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    fail_restart: bool,
}

impl FakeRuntime {
    pub fn new(containers: Vec<ContainerRecord>) -> Self {
        Self {
            containers: Mutex::new(containers),
            ..Default::default()
        }
    }

    /// A runtime whose restarts always fail.
    pub fn failing_restart(containers: Vec<ContainerRecord>) -> Self {
        Self {
            fail_restart: true,
            ..Self::new(containers)
        }
    }

    pub fn set_containers(&self, containers: Vec<ContainerRecord>) {
        *self.containers.lock().unwrap() = containers;
    }

    /// Names of restarted containers, in order.
    pub fn restarted(&self) -> Vec<String> {
        self.restarted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_running(&self) -> Result<Vec<ContainerRecord>, WatchdogError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.containers.lock().unwrap().clone())
    }

    async fn restart(&self, container: &ContainerRecord) -> Result<(), WatchdogError> {
        if self.fail_restart {
            return Err(WatchdogError::Restart {
                name: container.name.clone(),
                reason: "daemon unavailable".to_string(),
            });
        }
        self.restarted.lock().unwrap().push(container.name.clone());
        Ok(())
    }
}

// --- FakeResolver ---

/// Answers from a mutable table. Unknown hosts are NXDOMAIN.
#[derive(Default)]
pub struct FakeResolver {
    answers: Mutex<HashMap<String, Result<Vec<IpAddr>, ResolveFailure>>>,
    queries: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, host: &str, ip: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(host.to_string(), Ok(vec![ip.parse().unwrap()]));
    }

    pub fn fail(&self, host: &str, failure: ResolveFailure) {
        self.answers
            .lock()
            .unwrap()
            .insert(host.to_string(), Err(failure));
    }

    /// Hosts queried so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AliasResolver for FakeResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveFailure> {
        self.queries.lock().unwrap().push(host.to_string());
        self.answers
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_else(|| Err(ResolveFailure::NxDomain(host.to_string())))
    }
}

// --- Watchdog builder ---

pub fn build_watchdog(runtime: Arc<FakeRuntime>, resolver: Arc<FakeResolver>) -> Watchdog {
    Watchdog::new(runtime, resolver, SIDECAR, INTERVAL)
}
