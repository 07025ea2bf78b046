//! Quartermaster — a memory-aware admission and placement controller for a
//! swarm-managed container cluster.
//!
//! Ports-and-adapters layout: `domain` holds the model and the `SwarmClient`
//! port; `swarm` provides the HTTP and mock implementations; `ledger` is the
//! single shared mutable state; `reconcile` and `scheduler` are the
//! background loops; `api` and `controller` are the admission surface;
//! `config` and `logging` are the ambient stack.

pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod ledger;
pub mod logging;
pub mod reconcile;
pub mod scheduler;
pub mod swarm;

/// Bytes per mebibyte, used to convert the memory fields on the wire
/// (always MiB) into the byte counts the ledger and the swarm API use.
pub const MIB: u64 = 1_048_576;
