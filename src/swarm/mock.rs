//! `MockSwarmClient` — an in-memory fake standing in for a real swarm
//! daemon in tests, following `adapters/substrates/mock.rs`'s shape: a
//! `RwLock`-protected store, pre-seeded or overridable responses, and a
//! `fail_*` knob per operation for exercising error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{ControllerError, ControllerResult};
use crate::domain::models::{Node, ServiceTemplate};
use crate::domain::ports::{ServiceInfo, SwarmClient, SwarmTaskInfo};

#[derive(Default)]
struct MockState {
    nodes: HashMap<String, Node>,
    services: HashMap<String, ServiceInfo>,
    tasks: Vec<SwarmTaskInfo>,
    /// Services/images whose next call should fail, to exercise
    /// upstream-error handling.
    failing: std::collections::HashSet<String>,
}

pub struct MockSwarmClient {
    state: Arc<RwLock<MockState>>,
    next_id: AtomicU64,
}

impl Default for MockSwarmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSwarmClient {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState::default())),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn seed_node(&self, node: Node) {
        self.state.write().await.nodes.insert(node.id.clone(), node);
    }

    /// Register a swarm task report, as the Service Reconciler and `Status`
    /// would see it via `list_tasks`.
    pub async fn seed_task(&self, task: SwarmTaskInfo) {
        self.state.write().await.tasks.push(task);
    }

    /// Remove every task report for `service_id`, as if the swarm task
    /// vanished (stopped, failed, or the service was removed out-of-band).
    pub async fn vanish_task(&self, service_id: &str) {
        self.state
            .write()
            .await
            .tasks
            .retain(|t| t.service_id != service_id);
    }

    /// Remove a node as if it had left the cluster, for GC tests.
    pub async fn remove_node(&self, node_id: &str) {
        self.state.write().await.nodes.remove(node_id);
    }

    /// Make the next call touching `name` (a service name or image name)
    /// fail with an upstream error.
    pub async fn fail_next(&self, name: &str) {
        self.state.write().await.failing.insert(name.to_string());
    }

    async fn take_failure(&self, name: &str) -> bool {
        self.state.write().await.failing.remove(name)
    }
}

#[async_trait]
impl SwarmClient for MockSwarmClient {
    async fn list_nodes(&self) -> ControllerResult<Vec<Node>> {
        Ok(self.state.read().await.nodes.values().cloned().collect())
    }

    async fn inspect_node(&self, node_id: &str) -> ControllerResult<Node> {
        self.state
            .read()
            .await
            .nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| ControllerError::NotFound(node_id.to_string()))
    }

    async fn list_tasks(&self) -> ControllerResult<Vec<SwarmTaskInfo>> {
        Ok(self.state.read().await.tasks.clone())
    }

    async fn inspect_service(&self, service_id: &str) -> ControllerResult<ServiceInfo> {
        self.state
            .read()
            .await
            .services
            .get(service_id)
            .cloned()
            .ok_or_else(|| ControllerError::NotFound(service_id.to_string()))
    }

    async fn update_service(
        &self,
        service_id: &str,
        _template: &ServiceTemplate,
        _version: u64,
        _node_id: &str,
    ) -> ControllerResult<()> {
        if self.take_failure(service_id).await {
            return Err(ControllerError::Upstream("mock update_service failure".into()));
        }
        let mut state = self.state.write().await;
        if let Some(service) = state.services.get_mut(service_id) {
            service.replicas = 1;
            service.version += 1;
            Ok(())
        } else {
            Err(ControllerError::NotFound(service_id.to_string()))
        }
    }

    async fn create_service(&self, template: &ServiceTemplate) -> ControllerResult<String> {
        if self.take_failure(&template.name).await {
            return Err(ControllerError::Upstream("mock create_service failure".into()));
        }
        let id = format!("svc-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.state.write().await.services.insert(
            id.clone(),
            ServiceInfo {
                id: id.clone(),
                name: template.name.clone(),
                replicas: 0,
                version: 0,
            },
        );
        Ok(id)
    }

    async fn remove_service(&self, service_id: &str) -> ControllerResult<()> {
        self.state.write().await.services.remove(service_id);
        Ok(())
    }

    async fn list_services(&self) -> ControllerResult<Vec<ServiceInfo>> {
        Ok(self.state.read().await.services.values().cloned().collect())
    }

    async fn pull_image(&self, image: &str, _registry_auth: Option<&str>) -> ControllerResult<()> {
        if self.take_failure(image).await {
            return Err(ControllerError::Upstream(format!("mock pull failure for {image}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NodeRole;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            hostname: format!("host-{id}"),
            platform_os: "linux".into(),
            platform_arch: "x86_64".into(),
            status: "active".into(),
            state: "ready".into(),
            role: NodeRole::Worker,
            capacity_bytes: 1024,
            available_bytes: 1024,
            cpu_count: 2,
            version: 1,
        }
    }

    fn template() -> ServiceTemplate {
        ServiceTemplate {
            name: "demo".into(),
            image: "alpine".into(),
            command: vec!["true".into()],
            labels: HashMap::new(),
            memory_bytes: 256,
            registry_auth: None,
        }
    }

    #[tokio::test]
    async fn create_then_update_bumps_replicas_and_version() {
        let client = MockSwarmClient::new();
        let svc_id = client.create_service(&template()).await.unwrap();

        let info = client.inspect_service(&svc_id).await.unwrap();
        assert_eq!(info.replicas, 0);

        client
            .update_service(&svc_id, &template(), 0, "n1")
            .await
            .unwrap();

        let info = client.inspect_service(&svc_id).await.unwrap();
        assert_eq!(info.replicas, 1);
        assert_eq!(info.version, 1);
    }

    #[tokio::test]
    async fn fail_next_triggers_exactly_one_upstream_error() {
        let client = MockSwarmClient::new();
        client.fail_next("demo").await;

        assert!(client.create_service(&template()).await.is_err());
        assert!(client.create_service(&template()).await.is_ok());
    }

    #[tokio::test]
    async fn remove_node_makes_it_disappear_from_list_nodes() {
        let client = MockSwarmClient::new();
        client.seed_node(node("n1")).await;
        assert_eq!(client.list_nodes().await.unwrap().len(), 1);

        client.remove_node("n1").await;
        assert!(client.list_nodes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn vanish_task_removes_it_from_list_tasks() {
        let client = MockSwarmClient::new();
        client
            .seed_task(SwarmTaskInfo {
                id: "t1".into(),
                service_id: "svc-1".into(),
                node_id: "n1".into(),
                state: "running".into(),
                message: "started".into(),
            })
            .await;

        assert_eq!(client.list_tasks().await.unwrap().len(), 1);
        client.vanish_task("svc-1").await;
        assert!(client.list_tasks().await.unwrap().is_empty());
    }
}
