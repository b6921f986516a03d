use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ArbiterError;

/// Identifier of a participant. Valid ids lie in `[0, max_nodes)`.
pub type NodeId = usize;

/// Identifier of the node a routing tree is being built toward.
pub type Destination = usize;

/// Fails unless `node < max_nodes`.
pub(crate) fn check_node(node: NodeId, max_nodes: usize) -> Result<(), ArbiterError> {
    if node >= max_nodes {
        return Err(ArbiterError::NodeOutOfRange { node, max_nodes });
    }
    Ok(())
}

/// Fails unless `destination < max_nodes`.
pub(crate) fn check_destination(
    destination: Destination,
    max_nodes: usize,
) -> Result<(), ArbiterError> {
    if destination >= max_nodes {
        return Err(ArbiterError::DestinationOutOfRange {
            destination,
            max_nodes,
        });
    }
    Ok(())
}

/// Identity of a [`Graph`](crate::Graph) inside a
/// [`GraphManager`](crate::GraphManager).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphKey {
    pub objective_function: String,
    pub destination: Destination,
}

impl GraphKey {
    pub fn new(objective_function: impl Into<String>, destination: Destination) -> Self {
        Self {
            objective_function: objective_function.into(),
            destination,
        }
    }
}

impl fmt::Display for GraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.objective_function, self.destination)
    }
}

/// A live edge as observed at a single instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeGrant {
    /// The node that claimed `to` as its successor.
    pub from: NodeId,
    /// The successor node.
    pub to: NodeId,
    /// When the lease was last granted or renewed.
    pub granted_at: DateTime<Utc>,
    /// When the lease stops counting as live unless renewed.
    pub expires_at: DateTime<Utc>,
}
