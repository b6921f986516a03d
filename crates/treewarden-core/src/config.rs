use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::ArbiterError;

/// Default upper bound on participant ids (exclusive).
pub const DEFAULT_MAX_NODES: usize = 50;

/// Largest `max_nodes` accepted by [`LeaseConfig::validate`]. Each graph
/// holds a `max_nodes * max_nodes` table.
pub const MAX_NODES_LIMIT: usize = 1024;

/// Default lease length, in seconds.
pub const DEFAULT_LEASE_SECS: u64 = 30;

/// Longest lease accepted by [`LeaseConfig::validate`].
const MAX_LEASE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Serde helper to serialize/deserialize `std::time::Duration` as seconds (u64).
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Sizing and timing shared by every graph built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseConfig {
    /// Node ids and destinations must be strictly below this value.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    /// How long a granted edge stays live without renewal.
    #[serde(
        default = "default_lease_duration",
        rename = "lease_duration_secs",
        with = "duration_secs"
    )]
    pub lease_duration: Duration,
}

fn default_max_nodes() -> usize {
    DEFAULT_MAX_NODES
}
fn default_lease_duration() -> Duration {
    Duration::from_secs(DEFAULT_LEASE_SECS)
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            lease_duration: default_lease_duration(),
        }
    }
}

impl LeaseConfig {
    /// Validate that all fields are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ArbiterError> {
        if self.max_nodes == 0 {
            return Err(ArbiterError::InvalidConfig(
                "max_nodes must be greater than zero".into(),
            ));
        }
        if self.max_nodes > MAX_NODES_LIMIT {
            return Err(ArbiterError::InvalidConfig(format!(
                "max_nodes must not exceed {}, got {}",
                MAX_NODES_LIMIT, self.max_nodes
            )));
        }
        if self.lease_duration.is_zero() {
            return Err(ArbiterError::InvalidConfig(
                "lease duration must be greater than zero".into(),
            ));
        }
        if self.lease_duration > MAX_LEASE {
            return Err(ArbiterError::InvalidConfig(format!(
                "lease duration must not exceed {} seconds, got {}",
                MAX_LEASE.as_secs(),
                self.lease_duration.as_secs()
            )));
        }
        Ok(())
    }

    /// The lease length as a chrono delta, after validation.
    pub(crate) fn lease_delta(&self) -> Result<TimeDelta, ArbiterError> {
        self.validate()?;
        TimeDelta::from_std(self.lease_duration)
            .map_err(|e| ArbiterError::InvalidConfig(format!("lease duration: {e}")))
    }
}
