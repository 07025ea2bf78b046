//! Core data model: nodes, tasks, placement, and the HTTP request/response
//! shapes that ride over the wire.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role reported by the swarm for a cluster member.
///
/// Only `Worker` nodes are admitted to the ledger (spec P2); managers are
/// filtered out during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Worker,
    Manager,
}

impl NodeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Manager => "manager",
        }
    }
}

/// A worker host as tracked by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub hostname: String,
    pub platform_os: String,
    pub platform_arch: String,
    pub status: String,
    pub state: String,
    pub role: NodeRole,
    pub capacity_bytes: u64,
    pub available_bytes: u64,
    pub cpu_count: u64,
    /// Swarm's optimistic-concurrency version token, needed to `update_service`.
    pub version: u64,
}

impl Node {
    /// A node is eligible for scheduling once the swarm reports it `"ready"`.
    pub fn is_ready(&self) -> bool {
        self.state == "ready"
    }
}

/// An ordered list of swarm placement constraints.
///
/// The scheduler always writes exactly two: `node.role == worker` and
/// `node.id == <chosen>` (spec P3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementDescriptor(pub Vec<String>);

impl PlacementDescriptor {
    pub fn for_node(node_id: &str) -> Self {
        Self(vec![
            "node.role == worker".to_string(),
            format!("node.id == {node_id}"),
        ])
    }
}

/// A placed service being tracked by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// The swarm service ID; doubles as the task identifier.
    pub id: String,
    pub name: String,
    pub memory_bytes: u64,
    pub image: String,
    pub command: Vec<String>,
    pub node_id: String,
    /// Always 1 once placed.
    pub replicas: u64,
    pub placement: PlacementDescriptor,
}

/// The prepared service template an admitted run request produces, plus the
/// service ID the swarm assigned it at creation time (0 replicas).
#[derive(Debug, Clone)]
pub struct ServiceTemplate {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub labels: HashMap<String, String>,
    pub memory_bytes: u64,
    pub registry_auth: Option<String>,
}

/// A queue entry: the prepared template, the assigned service ID, and the
/// cancellation signal carried from the originating request (spec §9).
pub struct QueueEntry {
    pub service_id: String,
    pub template: ServiceTemplate,
    pub cancellation: tokio_util::sync::CancellationToken,
}

// --- HTTP wire types -------------------------------------------------------

/// Body of `POST /run`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub token: String,
    pub command: String,
    pub image: String,
    #[serde(default)]
    pub name: String,
    /// Base64-encoded registry auth, forwarded verbatim to the swarm.
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Requested memory limit in MiB; 0/absent means use the configured default.
    #[serde(default)]
    pub memory: i64,
}

/// Body of `POST /stop`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopRequest {
    pub token: String,
    pub id: String,
}

/// Body accompanying `GET /status/:id` (token travels in the body per spec §6.1).
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub token: String,
}

/// Result of `Controller::status`, before it's wrapped into the wire-level
/// `SuccessResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SuccessResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: id.into(),
            status: None,
        }
    }

    pub fn with_status(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            success: true,
            id: id.into(),
            status: Some(status.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}
