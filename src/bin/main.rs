//! dnsdock-watchdog binary entry point.

use clap::Parser;
use dnsdock_watchdog::{telemetry, Config, DockerRuntime, HickoryResolver, Watchdog};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Restarts dnsdock when container aliases stop resolving.
///
/// Configured through environment variables (LOG_LEVEL, DOCKER_HOST,
/// DNS_RESOLVERS, DNSDOCK_CONTAINER_NAME, RESTART_INTERVAL, METRICS_PORT),
/// optionally read from a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "dnsdock-watchdog")]
#[command(version, about, long_about = None)]
struct Args {}

/// Cancel `shutdown` on SIGINT or SIGTERM.
async fn forward_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _args = Args::parse();

    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env()?;

    telemetry::init(&config.telemetry()).map_err(|e| e as Box<dyn std::error::Error>)?;

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    info!(
        docker_host = %config.docker_host,
        resolvers = ?config.dns_resolvers,
        restart_interval_secs = config.restart_interval,
        metrics_port = config.metrics_port,
        "Starting dnsdock-watchdog"
    );

    let runtime = DockerRuntime::connect(&config.docker_host)?;
    let resolver = HickoryResolver::new(&config.dns_resolvers, config.dns_timeout());

    let watchdog = Watchdog::new(
        Arc::new(runtime),
        Arc::new(resolver),
        config.dnsdock_container_name.clone(),
        config.restart_interval(),
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(forward_signals(shutdown.clone()));

    let result = watchdog.run(shutdown).await;

    telemetry::shutdown();

    if let Err(e) = result {
        error!("Watchdog error: {}", e);
        return Err(e.into());
    }

    info!("dnsdock-watchdog shutdown complete");
    Ok(())
}
