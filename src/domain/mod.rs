//! Domain layer: data model, error types, and the port the rest of the
//! controller depends on to reach the swarm.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ControllerError, ControllerResult};
pub use models::{Node, NodeRole, PlacementDescriptor, QueueEntry, ServiceTemplate, Task};
pub use ports::SwarmClient;
