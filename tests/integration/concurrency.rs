//! Integration test: concurrent lookups during membership changes.

use std::sync::Arc;

use axum::http::StatusCode;
use eddy_integration_tests::{TestRing, keys};

/// Writers churn nodes while readers keep resolving keys. A stable seed
/// node guarantees every lookup has an owner throughout.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(60000)]
async fn test_lookups_during_churn() {
    let ring = Arc::new(TestRing::new(32, &["stable"]));
    let all = Arc::new(keys(200));

    let mut tasks = Vec::new();

    for w in 0..4 {
        let ring = ring.clone();
        tasks.push(tokio::spawn(async move {
            for round in 0..25 {
                let id = format!("w{w}-{}", round % 3);
                assert_eq!(ring.add(&id).await, StatusCode::NO_CONTENT);
                assert_eq!(ring.remove(&id).await, StatusCode::NO_CONTENT);
            }
        }));
    }

    for _ in 0..4 {
        let ring = ring.clone();
        let all = all.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..5 {
                for k in all.iter() {
                    assert!(ring.lookup(k).await.is_some(), "no owner for {k}");
                }
            }
        }));
    }

    for t in tasks {
        t.await.unwrap();
    }

    // Every churn node was removed again.
    assert_eq!(ring.nodes().await, vec!["stable"]);
    assert_eq!(ring.membership().ring().vnode_count(), 32);
}

/// Snapshots taken while writers run always show whole replica sets.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(60000)]
async fn test_snapshots_are_atomic() {
    let ring = Arc::new(TestRing::new(48, &["stable"]));

    let writer = {
        let ring = ring.clone();
        tokio::spawn(async move {
            for i in 0..100 {
                ring.add(&format!("node-{}", i % 5)).await;
                if i % 2 == 0 {
                    ring.remove(&format!("node-{}", (i + 1) % 5)).await;
                }
            }
        })
    };

    let reader = {
        let ring = ring.clone();
        tokio::spawn(async move {
            while !writer_done(&ring) {
                let snap = ring.membership().ring().snapshot();
                for member in snap.members() {
                    assert_eq!(snap.replicas_held(&member), 48, "{member} partially placed");
                }
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    ring.add("done").await;
    reader.await.unwrap();
}

fn writer_done(ring: &TestRing) -> bool {
    ring.membership().ring().contains(&"done".into())
}
