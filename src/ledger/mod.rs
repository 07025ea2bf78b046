//! C1 — Inventory Ledger.
//!
//! The single source of truth for node capacity and placed tasks. Everything
//! else (reconcilers, scheduler, HTTP handlers) reads and mutates the
//! cluster's state exclusively through this type; nothing else is allowed to
//! hold a second copy of `available_bytes`.
//!
//! Grounded on `application/resource_monitor.rs`'s `Arc<RwLock<..>>`
//! caching pattern and `services/circuit_breaker.rs`'s `RwLock<HashMap<..>>`
//! registries — reads take a shared lock, the rare scan-then-mutate path
//! (`reserve`, called from the scheduler) takes the write lock across both
//! steps so capacity checks and bookkeeping can never interleave with a
//! concurrent reservation (spec §9, "race between scan and reserve").

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::models::{Node, Task};

/// In-memory state protected by a single `RwLock`. Kept as one struct (rather
/// than two independently-locked maps) so `reserve` can take one write guard
/// and see a consistent view of both nodes and tasks.
#[derive(Default)]
struct State {
    nodes: HashMap<String, Node>,
    tasks: HashMap<String, Task>,
    /// Consecutive reconciliation cycles in which a node was absent from the
    /// swarm's node list but still present in `nodes`; purged at 2 (spec §9).
    missing_cycles: HashMap<String, u32>,
}

pub struct InventoryLedger {
    state: RwLock<State>,
}

impl Default for InventoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    /// Insert or refresh a node record as reported by the swarm. On first
    /// observation `available_bytes` is whatever the caller supplied
    /// (expected to equal capacity); on a later observation of the same id,
    /// the ledger's current `available_bytes` is carried over rather than
    /// the freshly-reported value, so a reconciliation cycle never wipes out
    /// live reservations (spec §4.1/§4.2, P6). Resets the missing-cycle
    /// counter for nodes that are still present.
    pub async fn upsert_node(&self, mut node: Node) {
        let mut state = self.state.write().await;
        state.missing_cycles.remove(&node.id);
        if let Some(existing) = state.nodes.get(&node.id) {
            node.available_bytes = existing.available_bytes;
        }
        state.nodes.insert(node.id.clone(), node);
    }

    /// Remove every tracked node whose id is not in `present_ids`, after two
    /// consecutive absences (spec §9's GC-on-vanish improvement; avoids
    /// evicting a node on a single transient listing glitch).
    pub async fn purge_missing_nodes(&self, present_ids: &[String]) -> Vec<String> {
        let mut state = self.state.write().await;
        let tracked: Vec<String> = state.nodes.keys().cloned().collect();
        let mut purged = Vec::new();

        for id in tracked {
            if present_ids.contains(&id) {
                continue;
            }
            let count = state.missing_cycles.entry(id.clone()).or_insert(0);
            *count += 1;
            if *count >= 2 {
                state.nodes.remove(&id);
                state.missing_cycles.remove(&id);
                purged.push(id);
            }
        }

        if !purged.is_empty() {
            debug!(?purged, "purged nodes absent for two reconciliation cycles");
        }
        purged
    }

    pub async fn list_nodes(&self) -> Vec<Node> {
        self.state.read().await.nodes.values().cloned().collect()
    }

    /// The nodes eligible for placement: workers in `"ready"` state (P2).
    pub async fn snapshot_ready_nodes(&self) -> Vec<Node> {
        self.state
            .read()
            .await
            .nodes
            .values()
            .filter(|n| n.is_ready())
            .cloned()
            .collect()
    }

    pub async fn get_node(&self, node_id: &str) -> Option<Node> {
        self.state.read().await.nodes.get(node_id).cloned()
    }

    /// Atomically pick the first ready node with enough available memory and
    /// debit it by `memory_bytes`, returning its id. This is the one
    /// operation that must scan and mutate under the same write guard —
    /// splitting it into a read-then-write pair is exactly the race spec §9
    /// calls out.
    pub async fn reserve(&self, memory_bytes: u64) -> Option<String> {
        let mut state = self.state.write().await;
        // Iteration order over a HashMap is unspecified; sort by id so the
        // first-fit choice is deterministic and reproducible in tests (spec
        // §4.5 point 2).
        let mut candidates: Vec<&Node> = state
            .nodes
            .values()
            .filter(|n| n.is_ready() && n.available_bytes >= memory_bytes)
            .collect();
        candidates.sort_by(|a, b| a.id.cmp(&b.id));
        let candidate = candidates.first().map(|n| n.id.clone())?;

        if let Some(node) = state.nodes.get_mut(&candidate) {
            node.available_bytes -= memory_bytes;
        }
        debug!(node_id = %candidate, memory_bytes, "reserved capacity");
        Some(candidate)
    }

    /// Credit memory back to a node, e.g. after a service is removed or a
    /// placement attempt fails and must be retried on another node.
    pub async fn release(&self, node_id: &str, memory_bytes: u64) {
        let mut state = self.state.write().await;
        if let Some(node) = state.nodes.get_mut(node_id) {
            node.available_bytes = (node.available_bytes + memory_bytes).min(node.capacity_bytes);
            debug!(node_id, memory_bytes, "released capacity");
        }
    }

    pub async fn add_task(&self, task: Task) {
        self.state.write().await.tasks.insert(task.id.clone(), task);
    }

    pub async fn remove_task(&self, task_id: &str) -> Option<Task> {
        self.state.write().await.tasks.remove(task_id)
    }

    pub async fn get_task(&self, task_id: &str) -> Option<Task> {
        self.state.read().await.tasks.get(task_id).cloned()
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.values().cloned().collect()
    }

    /// Total available memory across all ready nodes, used by property tests
    /// to assert P1 (memory conservation: reservations plus availability
    /// always sum to total capacity).
    pub async fn total_available(&self) -> u64 {
        self.state
            .read()
            .await
            .nodes
            .values()
            .map(|n| n.available_bytes)
            .sum()
    }

    pub async fn total_capacity(&self) -> u64 {
        self.state
            .read()
            .await
            .nodes
            .values()
            .map(|n| n.capacity_bytes)
            .sum()
    }
}
