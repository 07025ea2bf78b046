//! Wire shapes for the subset of the Docker Engine swarm API this controller
//! calls: `GET /nodes`, `GET /nodes/:id`, `GET /tasks`, `GET /services/:id`,
//! `POST /services/:id/update`, `POST /services/create`, `DELETE
//! /services/:id`, `GET /services`, `POST /images/create`.
//!
//! Only the fields the controller reads or writes are modeled; everything
//! else on the real API response is ignored by `#[serde(default)]` /
//! simply-absent fields, the same selective-deserialize approach
//! `adapters/substrates/anthropic_api.rs` takes toward the Anthropic API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct NodeDescription {
    pub hostname: String,
    pub platform: NodePlatform,
}

#[derive(Debug, Deserialize)]
pub struct NodePlatform {
    #[serde(rename = "OS")]
    pub os: String,
    #[serde(rename = "Architecture")]
    pub architecture: String,
}

#[derive(Debug, Deserialize)]
pub struct NodeResources {
    #[serde(rename = "NanoCPUs")]
    pub nano_cpus: i64,
    #[serde(rename = "MemoryBytes")]
    pub memory_bytes: i64,
}

#[derive(Debug, Deserialize)]
pub struct NodeSpec {
    pub role: String,
    pub availability: String,
}

#[derive(Debug, Deserialize)]
pub struct NodeStatus {
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct NodeVersion {
    pub index: u64,
}

/// A single element of `GET /nodes`.
#[derive(Debug, Deserialize)]
pub struct SwarmNode {
    #[serde(rename = "ID")]
    pub id: String,
    pub version: NodeVersion,
    pub description: NodeDescription,
    pub status: NodeStatus,
    pub spec: NodeSpec,
    #[serde(rename = "Resources", default)]
    pub resources: Option<NodeResources>,
}

#[derive(Debug, Deserialize)]
pub struct TaskStatus {
    pub state: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskSpec {
    #[serde(rename = "ContainerSpec", default)]
    pub container_spec: Option<ContainerSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ContainerSpec {
    #[serde(default)]
    pub image: String,
}

/// A single element of `GET /tasks`.
#[derive(Debug, Deserialize)]
pub struct SwarmTask {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "ServiceID")]
    pub service_id: String,
    #[serde(rename = "NodeID")]
    pub node_id: String,
    pub status: TaskStatus,
    pub spec: TaskSpec,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceVersion {
    pub index: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplicatedService {
    pub replicas: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceMode {
    pub replicated: ReplicatedService,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Placement {
    pub constraints: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceSpec {
    #[serde(rename = "MemoryBytes")]
    pub memory_bytes: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub limits: ResourceSpec,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceContainerSpec {
    pub image: String,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub labels: std::collections::HashMap<String, String>,
    #[serde(rename = "StopSignal")]
    pub stop_signal: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestartPolicy {
    #[serde(rename = "Condition")]
    pub condition: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceTaskSpec {
    #[serde(rename = "ContainerSpec")]
    pub container_spec: ServiceContainerSpec,
    pub placement: Placement,
    pub resources: ResourceRequirements,
    #[serde(rename = "RestartPolicy")]
    pub restart_policy: RestartPolicy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceSpecBody {
    pub name: String,
    #[serde(rename = "TaskTemplate")]
    pub task_template: ServiceTaskSpec,
    pub mode: ServiceMode,
}

/// Body of `POST /services/create`.
#[derive(Debug, Serialize)]
pub struct CreateServiceRequest {
    #[serde(flatten)]
    pub spec: ServiceSpecBody,
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceResponse {
    #[serde(rename = "ID")]
    pub id: String,
}

/// A single element of `GET /services`, and the body of `GET /services/:id`.
#[derive(Debug, Deserialize)]
pub struct SwarmService {
    #[serde(rename = "ID")]
    pub id: String,
    pub version: ServiceVersion,
    pub spec: ServiceSpecName,
}

#[derive(Debug, Deserialize)]
pub struct ServiceSpecName {
    pub name: String,
    #[serde(rename = "Mode")]
    pub mode: ServiceMode,
}
