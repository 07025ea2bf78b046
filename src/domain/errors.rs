//! Domain-level errors for the placement controller.

use thiserror::Error;

/// Errors surfaced by the admission/lifecycle API and the swarm client,
/// mapped 1:1 onto spec §7's five error kinds.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized")]
    Auth,

    #[error("swarm error: {0}")]
    Upstream(String),

    #[error("placement queue is full")]
    Busy,

    #[error("not found: {0}")]
    NotFound(String),
}

pub type ControllerResult<T> = Result<T, ControllerError>;

impl From<reqwest::Error> for ControllerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}
