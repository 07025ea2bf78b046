//! Service Reconciler (C3): the authoritative garbage collector for memory
//! reservations. Any ledger task whose swarm task is no longer `"running"`
//! is dropped and its memory credited back to its node (spec §4.3, P5).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{info, warn};

use crate::domain::ports::SwarmClient;
use crate::ledger::InventoryLedger;

pub struct ServiceReconciler {
    ledger: Arc<InventoryLedger>,
    swarm: Arc<dyn SwarmClient>,
}

impl ServiceReconciler {
    pub fn new(ledger: Arc<InventoryLedger>, swarm: Arc<dyn SwarmClient>) -> Self {
        Self { ledger, swarm }
    }

    /// Run one cycle: fetch every task the swarm currently knows about,
    /// build the running-service survivor set from it, then drop and
    /// release anything in the ledger that isn't in that set.
    pub async fn reconcile_once(&self) {
        let running_ids: HashSet<String> = match self.swarm.list_tasks().await {
            Ok(tasks) => tasks
                .into_iter()
                .filter(|t| t.state == "running")
                .map(|t| t.service_id)
                .collect(),
            Err(err) => {
                warn!(error = %err, "service reconciler: list_tasks failed, skipping this cycle");
                return;
            }
        };

        let tracked = self.ledger.list_tasks().await;
        let mut reclaimed = Vec::new();

        for task in tracked {
            if running_ids.contains(&task.id) {
                continue;
            }
            self.ledger.remove_task(&task.id).await;
            self.ledger.release(&task.node_id, task.memory_bytes).await;
            reclaimed.push(task.id);
        }

        if !reclaimed.is_empty() {
            info!(?reclaimed, "service reconciler: reclaimed memory for vanished tasks");
        }
    }

    pub fn spawn(
        self: Arc<Self>,
        interval_duration: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = interval_duration.as_secs(), "service reconciler started");
            self.reconcile_once().await;

            let mut ticker = interval(interval_duration);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.reconcile_once().await;
                    }
                    _ = shutdown.recv() => {
                        info!("service reconciler shutting down");
                        break;
                    }
                }
            }
        })
    }
}
