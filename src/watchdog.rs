//! The watchdog loop: reconcile, restart dnsdock if needed, sleep, repeat.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::WatchdogError;
use crate::inventory::ContainerRuntime;
use crate::metrics::{self, Timer};
use crate::reconciler::{self, AliasFailure};
use crate::resolver::AliasResolver;

/// Result of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Number of aliases sent to the resolver.
    pub checked: usize,
    /// Whether dnsdock was restarted.
    pub restarted: bool,
    /// The failure that caused the restart, if any.
    pub failure: Option<AliasFailure>,
}

/// Keeps dnsdock in sync with the running containers.
pub struct Watchdog {
    runtime: Arc<dyn ContainerRuntime>,
    resolver: Arc<dyn AliasResolver>,
    sidecar_name: String,
    interval: Duration,
    restarts: AtomicU64,
}

impl Watchdog {
    /// Create a watchdog for the sidecar named `sidecar_name`.
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        resolver: Arc<dyn AliasResolver>,
        sidecar_name: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            runtime,
            resolver,
            sidecar_name: sidecar_name.into(),
            interval,
            restarts: AtomicU64::new(0),
        }
    }

    /// Number of restarts performed by this watchdog.
    pub fn restart_count(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// Run a single pass: list containers, reconcile, restart if required.
    pub async fn run_pass(&self) -> Result<PassReport, WatchdogError> {
        let timer = Timer::start();

        let inventory = self.runtime.list_running().await?;
        let decision =
            reconciler::reconcile(&inventory, &self.sidecar_name, self.resolver.as_ref()).await?;

        if decision.restart_required {
            self.runtime.restart(decision.sidecar).await?;
            self.restarts.fetch_add(1, Ordering::Relaxed);
            metrics::record_restart();
            info!(
                container = %decision.sidecar.name,
                restarts = self.restart_count(),
                "Restarted dnsdock."
            );
        }

        metrics::record_pass(decision.checked, decision.restart_required, timer.elapsed());
        debug!(
            containers = inventory.len(),
            checked = decision.checked,
            restarted = decision.restart_required,
            "pass complete"
        );

        Ok(PassReport {
            checked: decision.checked,
            restarted: decision.restart_required,
            failure: decision.failure,
        })
    }

    /// Run passes every `interval` until `shutdown` is cancelled.
    ///
    /// A pass in progress always completes; only the sleep is interrupted.
    /// A fatal error ends the loop.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), WatchdogError> {
        info!(
            sidecar = %self.sidecar_name,
            interval_secs = self.interval.as_secs(),
            "Starting loop."
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            self.run_pass().await?;

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(restarts = self.restart_count(), "Watchdog loop stopped");
        Ok(())
    }
}
