use crate::types::{Destination, NodeId};

/// Errors raised by the arbitration core.
///
/// A refused grant is not an error: `request_edge` reports it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArbiterError {
    #[error("node {node} out of range: must be below {max_nodes}")]
    NodeOutOfRange { node: NodeId, max_nodes: usize },

    #[error("destination {destination} out of range: must be below {max_nodes}")]
    DestinationOutOfRange {
        destination: Destination,
        max_nodes: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
