//! Integration test: membership churn.
//!
//! Add and remove nodes over the HTTP API and check that only the keys
//! owned by the changed node move.

use std::sync::Arc;

use axum::http::StatusCode;
use eddy_integration_tests::{TestRing, keys};
use eddy_placement::{Fnv1aHasher, Ring};

/// The classic demo ring: 3 replicas, Node1..Node3.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_three_node_scenario() {
    let ring = TestRing::new(3, &["Node1", "Node2", "Node3"]);

    let alpha = ring.lookup("alpha").await.unwrap();
    assert!(["Node1", "Node2", "Node3"].contains(&alpha.as_str()));

    let all = keys(1_000);
    let before = ring.owners(&all).await;

    assert_eq!(ring.remove("Node2").await, StatusCode::NO_CONTENT);
    assert_eq!(ring.nodes().await, vec!["Node1", "Node3"]);

    let after = ring.owners(&all).await;
    for ((k, b), a) in all.iter().zip(&before).zip(&after) {
        if b != "Node2" {
            assert_eq!(b, a, "{k} was on {b} but moved to {a}");
        } else {
            assert_ne!(a, "Node2", "{k} still maps to the removed node");
        }
    }
}

/// Removing a node and adding it back restores every original owner.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_remove_then_readd_restores_placement() {
    let ring = TestRing::new(32, &["a", "b", "c", "d"]);
    let all = keys(2_000);
    let before = ring.owners(&all).await;

    ring.remove("c").await;
    ring.add("e").await;
    ring.add("c").await;
    ring.remove("e").await;

    assert_eq!(ring.owners(&all).await, before);
}

/// Growing 2 -> 5 nodes: each step only moves keys onto the new node.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_growth_moves_keys_only_to_new_nodes() {
    let ring = TestRing::new(64, &["n1", "n2"]);
    let all = keys(3_000);
    let mut current = ring.owners(&all).await;

    for new in ["n3", "n4", "n5"] {
        assert_eq!(ring.add(new).await, StatusCode::NO_CONTENT);
        let next = ring.owners(&all).await;

        let mut moved = 0usize;
        for (b, a) in current.iter().zip(&next) {
            if a != b {
                assert_eq!(a, new, "key moved from {b} to {a}, not to {new}");
                moved += 1;
            }
        }
        assert!(moved > 0, "adding {new} moved no keys");
        current = next;
    }

    assert_eq!(ring.nodes().await.len(), 5);
}

/// Emptying the ring makes lookups report absence, not fail.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_drain_to_empty_and_refill() {
    let ring = TestRing::new(3, &["Node1", "Node2"]);

    ring.remove("Node1").await;
    ring.remove("Node2").await;
    assert!(ring.nodes().await.is_empty());
    assert_eq!(ring.lookup("alpha").await, None);

    ring.add("Node9").await;
    assert_eq!(ring.lookup("alpha").await.as_deref(), Some("Node9"));
}

/// The FNV-1a ring gives the same answers through the API as a local ring.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_api_matches_local_ring() {
    let seeds = ["x", "y", "z"];
    let ring = TestRing::with_ring(
        Ring::with_hasher(5, Arc::new(Fnv1aHasher)).unwrap(),
        &seeds,
    );

    let mut local = Ring::with_hasher(5, Arc::new(Fnv1aHasher)).unwrap();
    for s in seeds {
        local.add_node(s.into());
    }

    for k in keys(500) {
        let expected = local.lookup(&k).map(|n| n.identifier().to_string());
        assert_eq!(ring.lookup(&k).await, expected, "owner differs for {k}");
    }
}

/// Keys with characters that need encoding still resolve.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_unusual_keys() {
    let ring = TestRing::new(3, &["Node1", "Node2", "Node3"]);
    for k in ["", " ", "a+b c", "a/b?c=d&e", "100%", "ключ", "🦀"] {
        let owner = ring.lookup(k).await.unwrap();
        assert_eq!(Some(owner), ring.membership().node_for_key(k).map(|n| n.into_identifier()));
    }
}

/// Identifiers with reserved characters survive the query string intact.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_unusual_identifiers() {
    let ring = TestRing::new(3, &[]);
    for id in ["cache node+1", "rack/a&b=c"] {
        assert_eq!(ring.add(id).await, StatusCode::NO_CONTENT);
    }
    assert_eq!(ring.nodes().await, vec!["cache node+1", "rack/a&b=c"]);

    assert_eq!(ring.remove("cache node+1").await, StatusCode::NO_CONTENT);
    assert_eq!(ring.nodes().await, vec!["rack/a&b=c"]);
}
