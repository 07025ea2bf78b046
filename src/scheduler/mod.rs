//! Placement Queue (C4) and Scheduler (C5).
//!
//! The queue is a bounded `tokio::sync::mpsc` channel; admission uses
//! `try_send` so a full queue surfaces `Busy` (503) instead of blocking the
//! HTTP handler (spec §9's required queue-full fix). The scheduler
//! supervisor drains it serially and spawns one concurrent placement unit
//! per entry, each running the wait-for-capacity / fetch / patch / update /
//! commit algorithm of spec §4.5 with the scan-and-reserve race closed by
//! `InventoryLedger::reserve`'s single write-lock critical section.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::domain::errors::{ControllerError, ControllerResult};
use crate::domain::models::{PlacementDescriptor, QueueEntry, Task};
use crate::domain::ports::SwarmClient;
use crate::ledger::InventoryLedger;

/// The sending half handed to the admission path.
#[derive(Clone)]
pub struct PlacementQueue {
    tx: mpsc::Sender<QueueEntry>,
}

impl PlacementQueue {
    /// Create a bounded channel of `capacity` (spec's `QUEUE_CAP`), returning
    /// the sender and the receiver the scheduler supervisor consumes.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<QueueEntry>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Non-blocking enqueue; a full queue is surfaced to the caller as
    /// `Busy` rather than making the HTTP handler wait.
    pub fn try_enqueue(&self, entry: QueueEntry) -> ControllerResult<()> {
        self.tx.try_send(entry).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => ControllerError::Busy,
            mpsc::error::TrySendError::Closed(_) => {
                ControllerError::Upstream("placement queue is no longer accepting entries".into())
            }
        })
    }
}

pub struct Scheduler {
    ledger: Arc<InventoryLedger>,
    swarm: Arc<dyn SwarmClient>,
    retry_interval: Duration,
    /// Overall deadline per placement unit; `None` retains the source's
    /// unbounded retry policy (still cancellable, per spec §9).
    deadline: Option<Duration>,
}

impl Scheduler {
    pub fn new(
        ledger: Arc<InventoryLedger>,
        swarm: Arc<dyn SwarmClient>,
        retry_interval: Duration,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            ledger,
            swarm,
            retry_interval,
            deadline,
        }
    }

    /// Drain `rx` serially, spawning one placement unit per entry, until the
    /// queue closes or `shutdown` fires. Placement units keep running
    /// independently of the supervisor loop so one slow wait doesn't stall
    /// the others.
    pub fn spawn(
        self: Arc<Self>,
        mut rx: mpsc::Receiver<QueueEntry>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!("scheduler supervisor started");
            loop {
                tokio::select! {
                    entry = rx.recv() => {
                        match entry {
                            Some(entry) => {
                                let scheduler = Arc::clone(&self);
                                tokio::spawn(async move { scheduler.place(entry).await });
                            }
                            None => {
                                info!("placement queue closed, scheduler supervisor exiting");
                                break;
                            }
                        }
                    }
                    _ = shutdown.recv() => {
                        info!("scheduler supervisor shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Run one placement unit per spec §4.5.
    async fn place(&self, entry: QueueEntry) {
        let Some(node_id) = self.wait_for_capacity(&entry).await else {
            return;
        };

        let service_info = match self.swarm.inspect_service(&entry.service_id).await {
            Ok(info) => info,
            Err(err) => {
                warn!(service_id = %entry.service_id, error = %err, "placement: inspect_service failed, abandoning");
                self.ledger
                    .release(&node_id, entry.template.memory_bytes)
                    .await;
                return;
            }
        };

        let mut template = entry.template.clone();
        template.name = service_info.name;

        let update = self
            .swarm
            .update_service(&entry.service_id, &template, service_info.version, &node_id)
            .await;

        match update {
            Ok(()) => {
                let task = Task {
                    id: entry.service_id.clone(),
                    name: template.name,
                    memory_bytes: template.memory_bytes,
                    image: template.image,
                    command: template.command,
                    node_id: node_id.clone(),
                    replicas: 1,
                    placement: PlacementDescriptor::for_node(&node_id),
                };
                self.ledger.add_task(task).await;
                info!(service_id = %entry.service_id, node_id = %node_id, "placed");
            }
            Err(err) => {
                warn!(service_id = %entry.service_id, node_id = %node_id, error = %err, "placement: update_service failed, abandoning and releasing capacity");
                self.ledger
                    .release(&node_id, entry.template.memory_bytes)
                    .await;
            }
        }
    }

    /// Scan-and-reserve loop. Returns `None` if the entry was cancelled or
    /// its deadline elapsed before a node had capacity.
    async fn wait_for_capacity(&self, entry: &QueueEntry) -> Option<String> {
        let deadline = self.deadline.map(|d| Instant::now() + d);

        loop {
            if entry.cancellation.is_cancelled() {
                info!(service_id = %entry.service_id, "placement cancelled while waiting for capacity");
                return None;
            }

            if let Some(node_id) = self.ledger.reserve(entry.template.memory_bytes).await {
                return Some(node_id);
            }

            if let Some(dl) = deadline {
                if Instant::now() >= dl {
                    warn!(service_id = %entry.service_id, "placement deadline exceeded waiting for capacity");
                    return None;
                }
            }

            tokio::select! {
                () = tokio::time::sleep(self.retry_interval) => {}
                () = entry.cancellation.cancelled() => {
                    info!(service_id = %entry.service_id, "placement cancelled during retry sleep");
                    return None;
                }
            }
        }
    }
}
