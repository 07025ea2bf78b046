//! `HttpSwarmClient` — talks to the Docker Engine API's swarm endpoints over
//! `reqwest`, the way `original_source/manager/run.go` and `manager/status.go`
//! used `docker/docker/client` to call `ImagePull`/`ServiceCreate`/
//! `ServiceList`/`TaskList`/`ServiceRemove`. Client construction follows
//! `adapters/substrates/anthropic_api.rs`'s `Client::builder().timeout(..)`
//! idiom.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::domain::errors::{ControllerError, ControllerResult};
use crate::domain::models::{Node, NodeRole, PlacementDescriptor, ServiceTemplate};
use crate::domain::ports::{ServiceInfo, SwarmClient, SwarmTaskInfo};

use super::types::{
    CreateServiceRequest, CreateServiceResponse, Placement, ReplicatedService, RestartPolicy,
    ResourceRequirements, ResourceSpec, ServiceContainerSpec, ServiceMode, ServiceSpecBody,
    ServiceTaskSpec, SwarmNode, SwarmService, SwarmTask,
};

/// Docker Engine API version pinned against; bumping this is a deliberate
/// compatibility decision, not something to infer from a running daemon.
const API_VERSION: &str = "v1.43";

pub struct HttpSwarmClient {
    client: Client,
    base_url: String,
}

impl HttpSwarmClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ControllerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ControllerError::Upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{API_VERSION}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn check_status(resp: reqwest::Response) -> ControllerResult<reqwest::Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(ControllerError::Upstream(format!(
                "swarm API returned {status}: {body}"
            )))
        }
    }
}

fn to_node(raw: SwarmNode) -> Node {
    let role = if raw.spec.role == "worker" {
        NodeRole::Worker
    } else {
        NodeRole::Manager
    };
    let (capacity_bytes, cpu_count) = raw
        .resources
        .map(|r| (r.memory_bytes.max(0) as u64, (r.nano_cpus.max(0) / 1_000_000_000) as u64))
        .unwrap_or((0, 0));

    Node {
        id: raw.id,
        hostname: raw.description.hostname,
        platform_os: raw.description.platform.os,
        platform_arch: raw.description.platform.architecture,
        status: raw.spec.availability,
        state: raw.status.state,
        role,
        capacity_bytes,
        available_bytes: capacity_bytes,
        cpu_count,
        version: raw.version.index,
    }
}

fn to_task(raw: SwarmTask) -> SwarmTaskInfo {
    SwarmTaskInfo {
        id: raw.id,
        service_id: raw.service_id,
        node_id: raw.node_id,
        state: raw.status.state,
        message: raw.status.message,
    }
}

fn to_service_info(raw: SwarmService) -> ServiceInfo {
    ServiceInfo {
        id: raw.id,
        name: raw.spec.name,
        replicas: raw.spec.mode.replicated.replicas,
        version: raw.version.index,
    }
}

#[async_trait]
impl SwarmClient for HttpSwarmClient {
    async fn list_nodes(&self) -> ControllerResult<Vec<Node>> {
        let resp = self.client.get(self.url("/nodes")).send().await?;
        let resp = Self::check_status(resp).await?;
        let raw: Vec<SwarmNode> = resp.json().await?;
        Ok(raw.into_iter().map(to_node).collect())
    }

    async fn inspect_node(&self, node_id: &str) -> ControllerResult<Node> {
        let resp = self
            .client
            .get(self.url(&format!("/nodes/{node_id}")))
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let raw: SwarmNode = resp.json().await?;
        Ok(to_node(raw))
    }

    async fn list_tasks(&self) -> ControllerResult<Vec<SwarmTaskInfo>> {
        let resp = self.client.get(self.url("/tasks")).send().await?;
        let resp = Self::check_status(resp).await?;
        let raw: Vec<SwarmTask> = resp.json().await?;
        Ok(raw.into_iter().map(to_task).collect())
    }

    async fn inspect_service(&self, service_id: &str) -> ControllerResult<ServiceInfo> {
        let resp = self
            .client
            .get(self.url(&format!("/services/{service_id}")))
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ControllerError::NotFound(service_id.to_string()));
        }
        let resp = Self::check_status(resp).await?;
        let raw: SwarmService = resp.json().await?;
        Ok(to_service_info(raw))
    }

    async fn update_service(
        &self,
        service_id: &str,
        template: &ServiceTemplate,
        version: u64,
        node_id: &str,
    ) -> ControllerResult<()> {
        let body = CreateServiceRequest {
            spec: ServiceSpecBody {
                name: template.name.clone(),
                task_template: ServiceTaskSpec {
                    container_spec: ServiceContainerSpec {
                        image: template.image.clone(),
                        command: template.command.clone(),
                        labels: template.labels.clone(),
                        stop_signal: "SIGINT".to_string(),
                    },
                    placement: Placement {
                        constraints: PlacementDescriptor::for_node(node_id).0,
                    },
                    resources: ResourceRequirements {
                        limits: ResourceSpec {
                            memory_bytes: template.memory_bytes as i64,
                        },
                    },
                    restart_policy: RestartPolicy {
                        condition: "none".to_string(),
                    },
                },
                mode: ServiceMode {
                    replicated: ReplicatedService { replicas: 1 },
                },
            },
        };

        let resp = self
            .client
            .post(self.url(&format!("/services/{service_id}/update")))
            .query(&[("version", version.to_string())])
            .json(&body)
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    async fn create_service(&self, template: &ServiceTemplate) -> ControllerResult<String> {
        let body = CreateServiceRequest {
            spec: ServiceSpecBody {
                name: template.name.clone(),
                task_template: ServiceTaskSpec {
                    container_spec: ServiceContainerSpec {
                        image: template.image.clone(),
                        command: template.command.clone(),
                        labels: template.labels.clone(),
                        stop_signal: "SIGINT".to_string(),
                    },
                    placement: Placement { constraints: Vec::new() },
                    resources: ResourceRequirements {
                        limits: ResourceSpec {
                            memory_bytes: template.memory_bytes as i64,
                        },
                    },
                    restart_policy: RestartPolicy {
                        condition: "none".to_string(),
                    },
                },
                mode: ServiceMode {
                    replicated: ReplicatedService { replicas: 0 },
                },
            },
        };

        let mut request = self.client.post(self.url("/services/create")).json(&body);
        if let Some(auth) = &template.registry_auth {
            request = request.header("X-Registry-Auth", auth);
        }

        let resp = request.send().await?;
        let resp = Self::check_status(resp).await?;
        let created: CreateServiceResponse = resp.json().await?;
        Ok(created.id)
    }

    async fn remove_service(&self, service_id: &str) -> ControllerResult<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/services/{service_id}")))
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    async fn list_services(&self) -> ControllerResult<Vec<ServiceInfo>> {
        let resp = self.client.get(self.url("/services")).send().await?;
        let resp = Self::check_status(resp).await?;
        let raw: Vec<SwarmService> = resp.json().await?;
        Ok(raw.into_iter().map(to_service_info).collect())
    }

    async fn pull_image(&self, image: &str, registry_auth: Option<&str>) -> ControllerResult<()> {
        let mut request = self
            .client
            .post(self.url("/images/create"))
            .query(&[("fromImage", image)]);
        if let Some(auth) = registry_auth {
            request = request.header("X-Registry-Auth", auth);
        }

        let resp = request.send().await?;
        Self::check_status(resp).await?;
        Ok(())
    }
}

