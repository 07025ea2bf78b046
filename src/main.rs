//! Quartermaster CLI entry point: load configuration, initialize logging,
//! wire the ledger/swarm client/controller, spawn the reconcilers and the
//! scheduler, and serve the admission API until SIGINT.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

use quartermaster::config::{CliOverrides, ConfigLoader};
use quartermaster::controller::Controller;
use quartermaster::ledger::InventoryLedger;
use quartermaster::reconcile::{NodeReconciler, ServiceReconciler};
use quartermaster::scheduler::{PlacementQueue, Scheduler};
use quartermaster::swarm::HttpSwarmClient;
use quartermaster::{api, logging};

/// Memory-aware task placement controller for a swarm-managed container
/// cluster.
#[derive(Parser, Debug)]
#[command(name = "quartermaster", version, about)]
struct Args {
    /// Bearer token all admission/lifecycle requests must present.
    #[arg(long, env = "TOKEN")]
    token: Option<String>,

    /// HTTP listen port.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Default per-task memory limit in MiB, used when a request omits one.
    #[arg(long, env = "MEMORY")]
    memory: Option<i64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fatal: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let overrides = CliOverrides {
        token: args.token,
        port: args.port,
        memory: args.memory,
    };

    let config = ConfigLoader::load(&overrides).context("failed to load configuration")?;
    let _logger_guard = logging::init(&config.log).context("failed to initialize logging")?;

    info!(port = config.port, swarm_endpoint = %config.swarm_endpoint, "quartermaster starting");

    let swarm = Arc::new(
        HttpSwarmClient::new(config.swarm_endpoint.clone(), Duration::from_secs(30))
            .context("failed to build swarm client")?,
    );
    let ledger = Arc::new(InventoryLedger::new());
    let (queue, rx) = PlacementQueue::new(config.queue_capacity);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let node_reconciler = Arc::new(NodeReconciler::new(ledger.clone(), swarm.clone()));
    let node_handle = node_reconciler.spawn(
        Duration::from_secs(config.node_interval_secs),
        shutdown_tx.subscribe(),
    );

    let service_reconciler = Arc::new(ServiceReconciler::new(ledger.clone(), swarm.clone()));
    let service_handle = service_reconciler.spawn(
        Duration::from_secs(config.service_interval_secs),
        shutdown_tx.subscribe(),
    );

    let scheduler = Arc::new(Scheduler::new(
        ledger.clone(),
        swarm.clone(),
        Duration::from_secs(config.retry_interval_secs),
        None,
    ));
    let scheduler_handle = scheduler.spawn(rx, shutdown_tx.subscribe());

    let controller = Arc::new(Controller::new(ledger, swarm, queue, config.clone()));
    let app = api::router(controller);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()))
        .await
        .context("HTTP server exited with an error")?;

    let _ = shutdown_tx.send(());
    for handle in [node_handle, service_handle, scheduler_handle] {
        let _ = handle.await;
    }

    Ok(())
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("received shutdown signal");
    let _ = shutdown_tx.send(());
}
