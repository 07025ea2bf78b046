//! Ports the domain depends on but does not implement.
//!
//! `SwarmClient` is the one seam the ledger, reconcilers, and scheduler all
//! call through; everything that talks to an actual cluster lives behind it
//! in `swarm::http`, with `swarm::mock` standing in for tests.

use async_trait::async_trait;

use super::errors::ControllerResult;
use super::models::{Node, ServiceTemplate};

/// A service as reported back by the swarm, independent of our own ledger.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub replicas: u64,
    pub version: u64,
}

/// A swarm task (service execution instance) as reported by `list_tasks`,
/// independent of whatever the ledger happens to be tracking. Used by the
/// Service Reconciler to build the survivor set and by `Status` to read a
/// task's status message.
#[derive(Debug, Clone)]
pub struct SwarmTaskInfo {
    pub id: String,
    pub service_id: String,
    pub node_id: String,
    pub state: String,
    pub message: String,
}

/// The swarm operations the controller needs, per spec §6.2.
///
/// Implementors must be `Send + Sync` so a single `Arc<dyn SwarmClient>` can
/// be shared across the reconcilers, the scheduler, and the HTTP handlers.
#[async_trait]
pub trait SwarmClient: Send + Sync {
    /// All nodes currently known to the swarm, worker and manager alike;
    /// role filtering is the Node Reconciler's job, not the client's.
    async fn list_nodes(&self) -> ControllerResult<Vec<Node>>;

    /// A single node's current record, used to refresh `available_bytes`
    /// and `version` without re-listing the whole cluster.
    async fn inspect_node(&self, node_id: &str) -> ControllerResult<Node>;

    /// All tasks currently known to the swarm, used by the Service
    /// Reconciler to build its survivor set and by `Status` to read a
    /// specific service's current task status.
    async fn list_tasks(&self) -> ControllerResult<Vec<SwarmTaskInfo>>;

    /// The current replica count and version token of one service.
    async fn inspect_service(&self, service_id: &str) -> ControllerResult<ServiceInfo>;

    /// Scale a parked (0-replica) service onto a node by writing placement
    /// constraints and bumping replicas to 1; takes the version token read
    /// at creation time for optimistic concurrency.
    async fn update_service(
        &self,
        service_id: &str,
        template: &ServiceTemplate,
        version: u64,
        node_id: &str,
    ) -> ControllerResult<()>;

    /// Create the parked service (0 replicas) that admission produces; the
    /// returned ID becomes the task/service identifier handed back to the
    /// caller of `POST /run`.
    async fn create_service(&self, template: &ServiceTemplate) -> ControllerResult<String>;

    /// Tear down a placed or still-queued service; used by `POST /stop`.
    async fn remove_service(&self, service_id: &str) -> ControllerResult<()>;

    /// All services currently known to the swarm, used by the Service
    /// Reconciler to detect services that vanished out from under the ledger.
    async fn list_services(&self) -> ControllerResult<Vec<ServiceInfo>>;

    /// Pull `image` ahead of service creation, forwarding `registry_auth`
    /// verbatim the way `original_source/manager/run.go` does.
    async fn pull_image(&self, image: &str, registry_auth: Option<&str>) -> ControllerResult<()>;
}
