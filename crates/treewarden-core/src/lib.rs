//! Treewarden Core — edge leasing and loop prevention for routing trees.
//!
//! This crate provides:
//! - [`Graph`] — the leased edge table for one (objective function, destination)
//!   pair, with a loop check run before every new grant.
//! - [`GraphManager`] — lazily created graphs for one network.
//! - [`NetworkManager`] — lazily created graph managers keyed by network id;
//!   the entry point handed to the transport layer.
//! - [`Clock`], [`SystemClock`] and [`ManualClock`] — the time source used to
//!   decide whether a lease is still live.

pub mod clock;
pub mod config;
pub mod error;
pub mod graph;
pub mod graph_manager;
pub mod network_manager;
pub mod types;

// Re-exports for convenience.
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LeaseConfig, DEFAULT_LEASE_SECS, DEFAULT_MAX_NODES, MAX_NODES_LIMIT};
pub use error::ArbiterError;
pub use graph::Graph;
pub use graph_manager::GraphManager;
pub use network_manager::NetworkManager;
pub use types::{Destination, EdgeGrant, GraphKey, NodeId};
