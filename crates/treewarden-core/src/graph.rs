//! Leased edge table for a single (objective function, destination) pair.
//!
//! An edge is never stored as present or absent. Each cell holds the instant
//! it was last granted, and liveness is re-derived on every read by comparing
//! that instant against the clock. Expired grants are left in place and are
//! simply overwritten by the next grant of the same edge.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::LeaseConfig;
use crate::error::ArbiterError;
use crate::types::{check_destination, check_node, Destination, EdgeGrant, GraphKey, NodeId};

/// Square `[from][to]` table of grant instants. `None` means never granted or
/// released.
#[derive(Debug)]
struct EdgeTable {
    size: usize,
    cells: Vec<Option<DateTime<Utc>>>,
}

impl EdgeTable {
    fn new(size: usize) -> Result<Self, ArbiterError> {
        let cells = size.checked_mul(size).ok_or_else(|| {
            ArbiterError::InvalidConfig(format!("edge table of {size}x{size} cells is too large"))
        })?;
        Ok(Self {
            size,
            cells: vec![None; cells],
        })
    }

    fn get(&self, from: NodeId, to: NodeId) -> Option<DateTime<Utc>> {
        self.cells[from * self.size + to]
    }

    fn set(&mut self, from: NodeId, to: NodeId, granted_at: Option<DateTime<Utc>>) {
        self.cells[from * self.size + to] = granted_at;
    }

    fn is_live(&self, from: NodeId, to: NodeId, now: DateTime<Utc>, lease: TimeDelta) -> bool {
        self.get(from, to)
            .is_some_and(|granted_at| now.signed_duration_since(granted_at) < lease)
    }

    /// Breadth-first search over live edges starting at `to`. Reaching `from`
    /// means a path `to -> .. -> from` exists, which `from -> to` would close.
    fn forms_loop(&self, from: NodeId, to: NodeId, now: DateTime<Utc>, lease: TimeDelta) -> bool {
        if from == to {
            return true;
        }

        let mut visited = vec![false; self.size];
        let mut to_visit = VecDeque::with_capacity(self.size);
        visited[to] = true;
        to_visit.push_back(to);

        while let Some(current) = to_visit.pop_front() {
            for next in 0..self.size {
                if visited[next] || !self.is_live(current, next, now, lease) {
                    continue;
                }
                if next == from {
                    return true;
                }
                visited[next] = true;
                to_visit.push_back(next);
            }
        }

        false
    }
}

/// The edge grants for one (objective function, destination) pair.
///
/// All reads and writes go through one mutex so that a loop check and the
/// grant that follows it observe the same table.
#[derive(Debug)]
pub struct Graph {
    key: GraphKey,
    max_nodes: usize,
    lease: TimeDelta,
    clock: Arc<dyn Clock>,
    edges: Mutex<EdgeTable>,
}

impl Graph {
    /// Create an empty graph. Fails if `config` is invalid or `destination`
    /// is out of range.
    pub fn new(
        objective_function: impl Into<String>,
        destination: Destination,
        config: &LeaseConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ArbiterError> {
        let lease = config.lease_delta()?;
        check_destination(destination, config.max_nodes)?;
        Self::from_parts(
            GraphKey::new(objective_function, destination),
            config.max_nodes,
            lease,
            clock,
        )
    }

    /// Create an empty graph on the wall clock.
    pub fn with_defaults(
        objective_function: impl Into<String>,
        destination: Destination,
    ) -> Result<Self, ArbiterError> {
        Self::new(
            objective_function,
            destination,
            &LeaseConfig::default(),
            Arc::new(SystemClock),
        )
    }

    /// Build from already-validated parts.
    pub(crate) fn from_parts(
        key: GraphKey,
        max_nodes: usize,
        lease: TimeDelta,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ArbiterError> {
        Ok(Self {
            key,
            max_nodes,
            lease,
            clock,
            edges: Mutex::new(EdgeTable::new(max_nodes)?),
        })
    }

    pub fn key(&self) -> &GraphKey {
        &self.key
    }

    pub fn objective_function(&self) -> &str {
        &self.key.objective_function
    }

    pub fn destination(&self) -> Destination {
        self.key.destination
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Ask for `from` to claim `to` as its successor.
    ///
    /// Returns the lease expiration on grant, `None` when the grant would
    /// close a loop among live edges (self-edges included). Renewing an
    /// edge that is still live always succeeds.
    pub fn request_edge(
        &self,
        from: NodeId,
        to: NodeId,
    ) -> Result<Option<DateTime<Utc>>, ArbiterError> {
        self.check_node(from)?;
        self.check_node(to)?;

        let mut table = self.edges.lock();
        let now = self.clock.now();

        if table.is_live(from, to, now, self.lease) {
            table.set(from, to, Some(now));
            tracing::debug!(graph = %self.key, from, to, "edge lease renewed");
            return Ok(Some(self.expiry(now)));
        }

        if table.forms_loop(from, to, now, self.lease) {
            tracing::debug!(graph = %self.key, from, to, "edge refused: would form a loop");
            return Ok(None);
        }

        table.set(from, to, Some(now));
        tracing::debug!(graph = %self.key, from, to, "edge granted");
        Ok(Some(self.expiry(now)))
    }

    /// Drop the grant for `from -> to`. Releasing an edge that is not live is
    /// a no-op.
    pub fn release_edge(&self, from: NodeId, to: NodeId) -> Result<(), ArbiterError> {
        self.check_node(from)?;
        self.check_node(to)?;

        self.edges.lock().set(from, to, None);
        tracing::debug!(graph = %self.key, from, to, "edge released");
        Ok(())
    }

    /// Would granting `from -> to` close a loop among edges live at `now`?
    ///
    /// Does not consider whether `from -> to` is itself live.
    pub fn forms_loop(
        &self,
        from: NodeId,
        to: NodeId,
        now: DateTime<Utc>,
    ) -> Result<bool, ArbiterError> {
        self.check_node(from)?;
        self.check_node(to)?;
        Ok(self.edges.lock().forms_loop(from, to, now, self.lease))
    }

    /// Is `from -> to` live right now?
    pub fn is_live(&self, from: NodeId, to: NodeId) -> Result<bool, ArbiterError> {
        self.check_node(from)?;
        self.check_node(to)?;
        let table = self.edges.lock();
        Ok(table.is_live(from, to, self.clock.now(), self.lease))
    }

    /// All live edges, observed at a single instant, ordered by `(from, to)`.
    pub fn live_edges(&self) -> Vec<EdgeGrant> {
        let table = self.edges.lock();
        let now = self.clock.now();

        let mut grants = Vec::new();
        for from in 0..self.max_nodes {
            for to in 0..self.max_nodes {
                if !table.is_live(from, to, now, self.lease) {
                    continue;
                }
                if let Some(granted_at) = table.get(from, to) {
                    grants.push(EdgeGrant {
                        from,
                        to,
                        granted_at,
                        expires_at: self.expiry(granted_at),
                    });
                }
            }
        }
        grants
    }

    /// End of the lease starting at `granted_at`, clamped to the last
    /// representable instant.
    fn expiry(&self, granted_at: DateTime<Utc>) -> DateTime<Utc> {
        granted_at
            .checked_add_signed(self.lease)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn check_node(&self, node: NodeId) -> Result<(), ArbiterError> {
        check_node(node, self.max_nodes)
    }
}
