use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};
use crate::config::LeaseConfig;
use crate::error::ArbiterError;
use crate::graph_manager::GraphManager;
use crate::types::{check_destination, Destination, EdgeGrant, NodeId};

/// Process-wide registry of [`GraphManager`]s keyed by network id.
///
/// Built once at startup and handed to the transport layer. Managers are
/// created on first access and never removed; concurrent first accesses to
/// the same network id all receive the same manager.
#[derive(Debug)]
pub struct NetworkManager {
    managers: DashMap<String, Arc<GraphManager>>,
    config: LeaseConfig,
    lease: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl NetworkManager {
    /// Create an empty registry on the wall clock.
    pub fn new(config: LeaseConfig) -> Result<Self, ArbiterError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an empty registry whose graphs read time from `clock`.
    pub fn with_clock(config: LeaseConfig, clock: Arc<dyn Clock>) -> Result<Self, ArbiterError> {
        let lease = config.lease_delta()?;
        tracing::info!(
            max_nodes = config.max_nodes,
            lease_secs = config.lease_duration.as_secs(),
            "network manager created"
        );
        Ok(Self {
            managers: DashMap::new(),
            config,
            lease,
            clock,
        })
    }

    /// Return the manager for `network_id`, creating it on first access.
    pub fn get_graph_manager(&self, network_id: &str) -> Arc<GraphManager> {
        if let Some(manager) = self.managers.get(network_id) {
            return Arc::clone(manager.value());
        }

        self.managers
            .entry(network_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(network_id, "creating graph manager");
                Arc::new(GraphManager::from_parts(
                    self.config.max_nodes,
                    self.lease,
                    Arc::clone(&self.clock),
                ))
            })
            .value()
            .clone()
    }

    /// Look up a manager without creating it.
    pub fn find_graph_manager(&self, network_id: &str) -> Option<Arc<GraphManager>> {
        self.managers
            .get(network_id)
            .map(|manager| Arc::clone(manager.value()))
    }

    /// Ask for `from` to claim `to` as its successor toward `destination`.
    ///
    /// `Ok(Some(expiration))` on grant, `Ok(None)` when refused.
    pub fn request_edge(
        &self,
        network_id: &str,
        objective_function: &str,
        destination: Destination,
        from: NodeId,
        to: NodeId,
    ) -> Result<Option<DateTime<Utc>>, ArbiterError> {
        self.get_graph_manager(network_id)
            .request_edge(objective_function, destination, from, to)
    }

    /// Drop the grant for `from -> to`. Always succeeds for in-range input.
    pub fn release_edge(
        &self,
        network_id: &str,
        objective_function: &str,
        destination: Destination,
        from: NodeId,
        to: NodeId,
    ) -> Result<(), ArbiterError> {
        self.get_graph_manager(network_id)
            .release_edge(objective_function, destination, from, to)
    }

    /// Live edges of one graph. Unknown networks and graphs have none.
    pub fn live_edges(
        &self,
        network_id: &str,
        objective_function: &str,
        destination: Destination,
    ) -> Result<Vec<EdgeGrant>, ArbiterError> {
        check_destination(destination, self.config.max_nodes)?;
        match self.find_graph_manager(network_id) {
            Some(manager) => manager.live_edges(objective_function, destination),
            None => Ok(Vec::new()),
        }
    }

    /// Number of networks seen so far.
    pub fn network_count(&self) -> usize {
        self.managers.len()
    }

    /// Ids of every network seen so far, sorted.
    pub fn network_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.managers.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn config(&self) -> &LeaseConfig {
        &self.config
    }
}

impl Default for NetworkManager {
    fn default() -> Self {
        let config = LeaseConfig::default();
        Self {
            managers: DashMap::new(),
            lease: TimeDelta::seconds(config.lease_duration.as_secs() as i64),
            config,
            clock: Arc::new(SystemClock),
        }
    }
}
