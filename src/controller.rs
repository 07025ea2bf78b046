//! The single value wiring the ledger, the swarm client, and the placement
//! queue behind the three admission/lifecycle operations of spec §4.6: Run,
//! Stop, Status. Grounded on `original_source/manager/{run,stop,status}.go`
//! for exact request/response shapes, with the container-stop-then-service-
//! remove fallback in `stop.go` dropped per spec §10 ("the spec keeps only
//! the swarm-service path").

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ControllerConfig;
use crate::domain::errors::{ControllerError, ControllerResult};
use crate::domain::models::{QueueEntry, RunRequest, ServiceTemplate, StatusResponse};
use crate::domain::ports::SwarmClient;
use crate::ledger::InventoryLedger;
use crate::scheduler::PlacementQueue;

pub struct Controller {
    ledger: Arc<InventoryLedger>,
    swarm: Arc<dyn SwarmClient>,
    queue: PlacementQueue,
    config: ControllerConfig,
}

impl Controller {
    /// The configured root token requests must present.
    pub fn token(&self) -> &str {
        &self.config.token
    }

    pub fn new(
        ledger: Arc<InventoryLedger>,
        swarm: Arc<dyn SwarmClient>,
        queue: PlacementQueue,
        config: ControllerConfig,
    ) -> Self {
        Self {
            ledger,
            swarm,
            queue,
            config,
        }
    }

    /// Run(request), spec §4.6. Validates, pulls the image, creates a
    /// parked (0-replica) service, and enqueues it for placement.
    pub async fn run(&self, request: RunRequest) -> ControllerResult<String> {
        if request.command.trim().is_empty() {
            return Err(ControllerError::Validation("command missing or invalid".into()));
        }
        if request.image.trim().is_empty() {
            return Err(ControllerError::Validation("image missing or invalid".into()));
        }

        let required_memory = if request.memory > 0 {
            (request.memory as u64) * crate::MIB
        } else {
            self.config.memory_bytes_default()
        };

        self.swarm
            .pull_image(&request.image, request.auth.as_deref())
            .await?;

        // `strings.Split(command, " ")` in the source: a literal
        // space-delimited split, not shell-word tokenization.
        let command: Vec<String> = request.command.split(' ').map(str::to_string).collect();

        let template = ServiceTemplate {
            name: request.name.clone(),
            image: request.image.clone(),
            command,
            labels: request.labels.clone(),
            memory_bytes: required_memory,
            registry_auth: request.auth.clone(),
        };

        let service_id = self.swarm.create_service(&template).await?;

        let entry = QueueEntry {
            service_id: service_id.clone(),
            template,
            cancellation: CancellationToken::new(),
        };
        self.queue.try_enqueue(entry)?;

        info!(service_id = %service_id, image = %request.image, "admitted run request");
        Ok(service_id)
    }

    /// Stop(request), spec §4.6. Any failure here — missing id or a swarm
    /// rejection — is surfaced as a validation-shaped (400) error; unlike
    /// `Status`, `Stop` never produces a 404.
    pub async fn stop(&self, id: &str) -> ControllerResult<()> {
        if id.trim().is_empty() {
            return Err(ControllerError::Validation("service id missing".into()));
        }

        self.swarm
            .remove_service(id)
            .await
            .map_err(|err| ControllerError::Validation(err.to_string()))?;

        if let Some(task) = self.ledger.get_task(id).await {
            self.ledger.remove_task(id).await;
            self.ledger.release(&task.node_id, task.memory_bytes).await;
        }

        info!(service_id = %id, "stopped");
        Ok(())
    }

    /// Status(id), spec §4.6. `NotFound` propagates as-is (404); any other
    /// swarm error is reported to the caller by the handler as 400.
    pub async fn status(&self, id: &str) -> ControllerResult<StatusResponse> {
        if id.trim().is_empty() {
            return Err(ControllerError::Validation("service id missing".into()));
        }

        let service = self.swarm.inspect_service(id).await?;

        if service.replicas == 0 {
            return Ok(StatusResponse {
                id: id.to_string(),
                status: "pending".to_string(),
            });
        }

        let tasks = self.swarm.list_tasks().await?;
        let status = tasks
            .into_iter()
            .find(|t| t.service_id == id)
            .map(|t| t.message)
            .ok_or_else(|| ControllerError::NotFound(id.to_string()))?;

        Ok(StatusResponse {
            id: id.to_string(),
            status,
        })
    }
}
