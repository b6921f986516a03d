//! Fixtures shared by the integration tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use treewarden_core::{ArbiterError, LeaseConfig, ManualClock, NetworkManager};

pub const NETWORK_1: &str = "net1";
pub const NETWORK_2: &str = "net2";
pub const OBJ_FUNC_1: &str = "ObjFunc1";
pub const OBJ_FUNC_2: &str = "ObjFunc2";
pub const DESTINATION_3: usize = 3;
pub const DESTINATION_4: usize = 4;

/// A registry on a clock that only moves when the test says so.
pub fn manual_registry() -> (NetworkManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let networks = NetworkManager::with_clock(LeaseConfig::default(), clock.clone())
        .expect("default config is valid");
    (networks, clock)
}

/// True when an in-range request was granted.
pub fn granted(result: Result<Option<DateTime<Utc>>, ArbiterError>) -> bool {
    result.expect("in-range request").is_some()
}
