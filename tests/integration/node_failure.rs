//! Integration test: node failures.
//!
//! The router does not fail over. A key owned by an unreachable node fails
//! with a transport error; keys owned by healthy nodes are unaffected.

use bytes::Bytes;
use circlet_net::NetError;
use circlet_router::RouterError;

use circlet_integration_tests::{HttpCluster, TestCluster, keys};

/// 4 in-memory nodes, one goes down.
/// Only the keys it owns fail, and they recover when it comes back.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_down_node_fails_only_its_keys() {
    let c = TestCluster::new(4).await;
    let keys = keys(120);
    for key in &keys {
        c.router()
            .upload_bytes(key, Bytes::from(key.clone()))
            .await
            .unwrap();
    }

    c.set_down("node-1", true).await;
    let down = c.node("node-1").clone();

    for key in &keys {
        let owner = c.router().assign(key).unwrap();
        let result = c.router().fetch(key).await;
        if owner == down {
            assert!(
                matches!(result, Err(RouterError::Transport(NetError::Unreachable(_)))),
                "{key} owned by down node should fail"
            );
        } else {
            assert_eq!(result.unwrap(), Bytes::from(key.clone()));
        }
    }
    // The ring is not changed by failures.
    assert_eq!(c.router().ring().len(), 4);

    c.set_down("node-1", false).await;
    for key in &keys {
        assert_eq!(c.router().fetch(key).await.unwrap(), Bytes::from(key.clone()));
    }
}

/// Uploads to a down owner fail without writing anywhere else.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_upload_to_down_owner_is_not_redirected() {
    let c = TestCluster::new(3).await;
    let key = "reports/latest.json";
    let owner = c.router().assign(key).unwrap();
    c.set_down(owner.name(), true).await;

    let err = c
        .router()
        .upload_bytes(key, Bytes::from_static(b"{}"))
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::Transport(NetError::Unreachable(_))));
    assert_eq!(c.total_stored().await, 0);
}

/// Over HTTP: a stopped server surfaces as a request error for its keys.
/// Removing it from the ring hands those keys to a live node.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_http_stopped_node() {
    let mut c = HttpCluster::new(3).await;
    let keys = keys(60);

    c.stop_node("http-0").await;
    let stopped = c.nodes().find(|n| n.name() == "http-0").unwrap().clone();

    let mut owned_by_stopped = Vec::new();
    for key in &keys {
        let owner = c.router().assign(key).unwrap();
        let result = c
            .router()
            .upload_bytes(key, Bytes::from_static(b"payload"))
            .await;
        if owner == stopped {
            assert!(
                matches!(result, Err(RouterError::Transport(NetError::Request(_)))),
                "{key}: expected request error, got {result:?}"
            );
            owned_by_stopped.push(key.clone());
        } else {
            result.unwrap();
        }
    }

    c.router().ring().remove(&stopped).unwrap();
    for key in &owned_by_stopped {
        let owner = c.router().assign(key).unwrap();
        assert_ne!(owner, stopped);
        c.router()
            .upload_bytes(key, Bytes::from_static(b"payload"))
            .await
            .unwrap();
    }
    for key in &keys {
        assert_eq!(
            c.router().fetch(key).await.unwrap(),
            Bytes::from_static(b"payload")
        );
    }
}
