use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};
use crate::config::{LeaseConfig, DEFAULT_LEASE_SECS, DEFAULT_MAX_NODES};
use crate::error::ArbiterError;
use crate::graph::Graph;
use crate::types::{check_destination, Destination, EdgeGrant, GraphKey, NodeId};

/// The graphs of one network, keyed by (objective function, destination).
///
/// Graphs are created on first access and never removed. Creation goes
/// through `DashMap::entry`, so callers racing on the same new key all end up
/// holding the same `Graph`.
#[derive(Debug)]
pub struct GraphManager {
    graphs: DashMap<GraphKey, Arc<Graph>>,
    max_nodes: usize,
    lease: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl GraphManager {
    /// Create an empty manager on the wall clock.
    pub fn new(config: &LeaseConfig) -> Result<Self, ArbiterError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an empty manager whose graphs read time from `clock`.
    pub fn with_clock(config: &LeaseConfig, clock: Arc<dyn Clock>) -> Result<Self, ArbiterError> {
        let lease = config.lease_delta()?;
        Ok(Self::from_parts(config.max_nodes, lease, clock))
    }

    pub(crate) fn from_parts(max_nodes: usize, lease: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            graphs: DashMap::new(),
            max_nodes,
            lease,
            clock,
        }
    }

    /// Return the graph for this key, creating an empty one on first access.
    pub fn get_graph(
        &self,
        objective_function: &str,
        destination: Destination,
    ) -> Result<Arc<Graph>, ArbiterError> {
        self.check_destination(destination)?;
        let key = GraphKey::new(objective_function, destination);

        if let Some(graph) = self.graphs.get(&key) {
            return Ok(Arc::clone(graph.value()));
        }

        // The shard guard returned by `entry` is dropped at the end of this
        // statement, before any caller can lock the graph itself.
        let graph = self
            .graphs
            .entry(key.clone())
            .or_try_insert_with(|| {
                tracing::debug!(graph = %key, "creating graph");
                Graph::from_parts(
                    key.clone(),
                    self.max_nodes,
                    self.lease,
                    Arc::clone(&self.clock),
                )
                .map(Arc::new)
            })?
            .value()
            .clone();
        Ok(graph)
    }

    /// Look up a graph without creating it.
    pub fn find_graph(&self, objective_function: &str, destination: Destination) -> Option<Arc<Graph>> {
        let key = GraphKey::new(objective_function, destination);
        self.graphs.get(&key).map(|graph| Arc::clone(graph.value()))
    }

    pub fn request_edge(
        &self,
        objective_function: &str,
        destination: Destination,
        from: NodeId,
        to: NodeId,
    ) -> Result<Option<DateTime<Utc>>, ArbiterError> {
        self.get_graph(objective_function, destination)?
            .request_edge(from, to)
    }

    pub fn release_edge(
        &self,
        objective_function: &str,
        destination: Destination,
        from: NodeId,
        to: NodeId,
    ) -> Result<(), ArbiterError> {
        self.get_graph(objective_function, destination)?
            .release_edge(from, to)
    }

    /// Live edges of one graph. An unknown graph has none.
    pub fn live_edges(
        &self,
        objective_function: &str,
        destination: Destination,
    ) -> Result<Vec<EdgeGrant>, ArbiterError> {
        self.check_destination(destination)?;
        Ok(self
            .find_graph(objective_function, destination)
            .map(|graph| graph.live_edges())
            .unwrap_or_default())
    }

    /// Number of graphs created so far.
    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Keys of every graph created so far, sorted.
    pub fn graph_keys(&self) -> Vec<GraphKey> {
        let mut keys: Vec<GraphKey> = self.graphs.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    fn check_destination(&self, destination: Destination) -> Result<(), ArbiterError> {
        check_destination(destination, self.max_nodes)
    }
}

impl Default for GraphManager {
    fn default() -> Self {
        Self::from_parts(
            DEFAULT_MAX_NODES,
            TimeDelta::seconds(DEFAULT_LEASE_SECS as i64),
            Arc::new(SystemClock),
        )
    }
}
