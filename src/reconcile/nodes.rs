//! Node Reconciler (C2): keeps the ledger's node set in sync with the swarm.
//!
//! Shaped like `application/resource_monitor.rs`'s `ResourceMonitor::start`:
//! an eager first pass, then a `tokio::time::interval` loop raced against a
//! `broadcast` shutdown signal via `tokio::select!`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{info, warn};

use crate::domain::models::NodeRole;
use crate::domain::ports::SwarmClient;
use crate::ledger::InventoryLedger;

pub struct NodeReconciler {
    ledger: Arc<InventoryLedger>,
    swarm: Arc<dyn SwarmClient>,
}

impl NodeReconciler {
    pub fn new(ledger: Arc<InventoryLedger>, swarm: Arc<dyn SwarmClient>) -> Self {
        Self { ledger, swarm }
    }

    /// Run one reconciliation cycle: list nodes, drop managers, upsert
    /// workers, then purge anything absent for two consecutive cycles
    /// (spec §9's required missing-node fix).
    pub async fn reconcile_once(&self) {
        let nodes = match self.swarm.list_nodes().await {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(error = %err, "node reconciler: swarm list_nodes failed, ledger left unchanged");
                return;
            }
        };

        let workers: Vec<_> = nodes
            .into_iter()
            .filter(|n| n.role == NodeRole::Worker)
            .collect();
        let present_ids: Vec<String> = workers.iter().map(|n| n.id.clone()).collect();

        for node in workers {
            self.ledger.upsert_node(node).await;
        }

        let purged = self.ledger.purge_missing_nodes(&present_ids).await;
        if !purged.is_empty() {
            info!(?purged, "node reconciler: purged nodes absent from the swarm");
        }
    }

    /// Spawn the background loop: an eager cycle, then one every
    /// `interval_duration`, until `shutdown` fires.
    pub fn spawn(
        self: Arc<Self>,
        interval_duration: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = interval_duration.as_secs(), "node reconciler started");
            self.reconcile_once().await;

            let mut ticker = interval(interval_duration);
            ticker.tick().await; // consume the immediate first tick, we already ran eagerly

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.reconcile_once().await;
                    }
                    _ = shutdown.recv() => {
                        info!("node reconciler shutting down");
                        break;
                    }
                }
            }
        })
    }
}
