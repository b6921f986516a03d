//! Integration test: edge leasing through the public registry API.
//!
//! Scenarios assume the following 4-node topology:
//! 1 <---> 2
//! 1 <---> 4
//! 2 <---> 3
//! 2 <---> 4
//! 3 <---> 4

use std::time::Duration;

use chrono::TimeDelta;
use treewarden_core::{ArbiterError, Clock, NetworkManager};
use treewarden_integration_tests::{
    granted, manual_registry, DESTINATION_3, DESTINATION_4, NETWORK_1, NETWORK_2, OBJ_FUNC_1,
    OBJ_FUNC_2,
};

// =========================================================================
// Grants and refusals
// =========================================================================

#[test]
fn test_reverse_of_live_edge_refused_for_all_pairs() {
    let (nm, _clock) = manual_registry();
    for a in 0..10usize {
        for b in 0..10usize {
            if a == b {
                continue;
            }
            // A fresh objective function per pair keeps the graphs independent.
            let objective = format!("pair-{a}-{b}");
            assert!(granted(nm.request_edge(NETWORK_1, &objective, DESTINATION_3, a, b)));
            assert!(!granted(nm.request_edge(NETWORK_1, &objective, DESTINATION_3, b, a)));
        }
    }
}

#[test]
fn test_request_same_link_twice() {
    let (nm, clock) = manual_registry();
    let first = nm
        .request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)
        .unwrap()
        .expect("first grant");
    let second = nm
        .request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)
        .unwrap()
        .expect("renewal");
    assert!(second >= first);
    assert_eq!(second, clock.now() + TimeDelta::seconds(30));
}

#[test]
fn test_triangle_124_loop_when_sending_to_3() {
    let (nm, _clock) = manual_registry();
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 4)));
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 4, 1)));
}

#[test]
fn test_triangle_124_loop_with_release() {
    let (nm, _clock) = manual_registry();
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 4)));
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 4, 1)));

    nm.release_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 4).unwrap();
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 4, 1)));
}

#[test]
fn test_full_tree_toward_destination_3() {
    let (nm, _clock) = manual_registry();
    // Every node points at a neighbour closer to 3.
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 3)));
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 4, 3)));

    // No edge back toward the leaves can be added.
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 3, 1)));
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 3, 2)));
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 1)));
    // A sideways edge that keeps the structure acyclic is fine.
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 4)));
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 4, 1)));

    let edges = nm.live_edges(NETWORK_1, OBJ_FUNC_1, DESTINATION_3).unwrap();
    let pairs: Vec<(usize, usize)> = edges.iter().map(|e| (e.from, e.to)).collect();
    assert_eq!(pairs, vec![(1, 2), (1, 4), (2, 3), (4, 3)]);
}

#[test]
fn test_self_edge_refused() {
    let (nm, _clock) = manual_registry();
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 2)));
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 3, 3)));
}

// =========================================================================
// Independence of graphs and networks
// =========================================================================

#[test]
fn test_different_objective_functions() {
    let (nm, _clock) = manual_registry();
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_2, DESTINATION_3, 2, 1)));
}

#[test]
fn test_different_destinations() {
    let (nm, _clock) = manual_registry();
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_4, 2, 1)));
}

#[test]
fn test_different_networks() {
    let (nm, _clock) = manual_registry();
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
    assert!(granted(nm.request_edge(NETWORK_2, OBJ_FUNC_1, DESTINATION_3, 2, 1)));
}

#[test]
fn test_network_manager_identity() {
    let nm = NetworkManager::default();
    let gm1 = nm.get_graph_manager(NETWORK_1);
    let gm2 = nm.get_graph_manager(NETWORK_2);
    assert!(!std::sync::Arc::ptr_eq(&gm1, &gm2));

    let gm3 = nm.get_graph_manager(NETWORK_1);
    assert!(std::sync::Arc::ptr_eq(&gm1, &gm3));
}

// =========================================================================
// Lease expiry
// =========================================================================

#[test]
fn test_reverse_granted_after_lease_lapses() {
    let (nm, clock) = manual_registry();
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));

    clock.advance(Duration::from_secs(29));
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 1)));

    clock.advance(Duration::from_secs(1));
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 1)));
    // The old direction is now the one that would loop.
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
}

#[test]
fn test_crashed_participant_stops_blocking_repair() {
    let (nm, clock) = manual_registry();
    // Node 4 holds 4 -> 1 and then goes silent; 1 -> 2 -> 4 keeps renewing.
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 4, 1)));
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 4)));

    for _ in 0..3 {
        clock.advance(Duration::from_secs(15));
        assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
    }
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 4)));
}

// =========================================================================
// Releases
// =========================================================================

#[test]
fn test_release_never_granted_is_noop() {
    let (nm, _clock) = manual_registry();
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));

    nm.release_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 3, 4).unwrap();
    nm.release_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 1).unwrap();
    nm.release_edge(NETWORK_1, OBJ_FUNC_2, DESTINATION_4, 1, 2).unwrap();

    // 1 -> 2 is untouched.
    assert!(!granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 2, 1)));
    assert_eq!(nm.live_edges(NETWORK_1, OBJ_FUNC_1, DESTINATION_3).unwrap().len(), 1);
}

#[test]
fn test_release_already_released_is_noop() {
    let (nm, _clock) = manual_registry();
    assert!(granted(nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2)));
    nm.release_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2).unwrap();
    nm.release_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2).unwrap();
    assert!(nm.live_edges(NETWORK_1, OBJ_FUNC_1, DESTINATION_3).unwrap().is_empty());
}

// =========================================================================
// Range checks
// =========================================================================

#[test]
fn test_out_of_range_inputs_are_typed_errors() {
    let (nm, _clock) = manual_registry();
    assert_eq!(
        nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 50),
        Err(ArbiterError::NodeOutOfRange {
            node: 50,
            max_nodes: 50
        })
    );
    assert_eq!(
        nm.release_edge(NETWORK_1, OBJ_FUNC_1, 50, 1, 2),
        Err(ArbiterError::DestinationOutOfRange {
            destination: 50,
            max_nodes: 50
        })
    );
}

#[test]
fn test_edge_grant_json_shape() {
    let (nm, _clock) = manual_registry();
    nm.request_edge(NETWORK_1, OBJ_FUNC_1, DESTINATION_3, 1, 2).unwrap();
    let edges = nm.live_edges(NETWORK_1, OBJ_FUNC_1, DESTINATION_3).unwrap();

    let json = serde_json::to_value(&edges[0]).unwrap();
    assert_eq!(json["from"], 1);
    assert_eq!(json["to"], 2);
    assert!(json["granted_at"].is_string());
    assert!(json["expires_at"].is_string());
}
