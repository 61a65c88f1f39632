//! Integration test: membership changes.
//!
//! Adding or removing a node only moves the keys on the arc that node gains
//! or gives up. Content is never migrated; keys that moved read as missing
//! until they are written again.

use bytes::Bytes;
use circlet_net::NetError;
use circlet_placement::Ring;
use circlet_router::RouterError;
use circlet_store::ContentStore;

use circlet_integration_tests::{HttpCluster, TestCluster, keys, test_data_seeded};

/// 4 nodes, 200 keys, add a 5th node.
/// Every key that moved, moved to the new node, and unmoved keys still read.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_add_node_moves_only_keys_it_gains() {
    let mut c = TestCluster::new(4).await;
    let keys = keys(200);
    for (i, key) in keys.iter().enumerate() {
        c.router()
            .upload_bytes(key, Bytes::from(test_data_seeded(256, i as u32)))
            .await
            .unwrap();
    }

    let before = c.router().ring().snapshot();
    let added = c.add_node().await;
    let after = c.router().ring().snapshot();
    let moved = Ring::diff(&before, &after, &keys);

    for r in &moved {
        assert_eq!(r.to, added, "{} moved to {} instead of the new node", r.key, r.to);
    }

    for (i, key) in keys.iter().enumerate() {
        let result = c.router().fetch(key).await;
        if moved.iter().any(|r| &r.key == key) {
            assert!(
                matches!(result, Err(RouterError::Transport(NetError::NotFound { .. }))),
                "{key} should be missing on its new owner"
            );
        } else {
            assert_eq!(result.unwrap().as_ref(), test_data_seeded(256, i as u32));
        }
    }
}

/// Removing a node hands its keys to its clockwise successor and leaves
/// every other key where it was.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_remove_node_moves_only_its_keys() {
    let c = TestCluster::new(5).await;
    let keys = keys(300);

    let before = c.router().ring().snapshot();
    let victim = c.remove_node("node-2");
    let after = c.router().ring().snapshot();

    let victim_slot = before.slot_of(&victim);
    let successor = after.successor_of_slot(&victim_slot).unwrap().clone();

    for r in Ring::diff(&before, &after, &keys) {
        assert_eq!(r.from, victim);
        assert_eq!(r.to, successor);
    }
    for key in &keys {
        let owner = before.successor_of(key.as_bytes()).unwrap();
        if owner != &victim {
            assert_eq!(after.successor_of(key.as_bytes()).unwrap(), owner);
        }
    }
}

/// Adding then removing the same node restores every assignment.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_add_then_remove_is_a_no_op() {
    let mut c = TestCluster::new(3).await;
    let keys = keys(500);

    let before = c.router().ring().snapshot();
    let node = c.add_node().await;
    c.remove_node(node.name());
    let after = c.router().ring().snapshot();

    assert!(Ring::diff(&before, &after, &keys).is_empty());
    assert_eq!(before.entries(), after.entries());
}

/// Rewriting the keys that moved makes the whole set readable again.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_rewrite_moved_keys_after_growth() {
    let mut c = TestCluster::new(2).await;
    let keys = keys(100);
    for key in &keys {
        c.router()
            .upload_bytes(key, Bytes::from(key.clone()))
            .await
            .unwrap();
    }

    let before = c.router().ring().snapshot();
    c.add_node().await;
    c.add_node().await;
    let after = c.router().ring().snapshot();

    let moved = Ring::diff(&before, &after, &keys);
    for r in &moved {
        c.router()
            .upload_bytes(&r.key, Bytes::from(r.key.clone()))
            .await
            .unwrap();
    }

    for key in &keys {
        assert_eq!(c.router().fetch(key).await.unwrap(), Bytes::from(key.clone()));
    }
    // Old copies stay behind on their previous owners.
    assert_eq!(c.total_stored().await, keys.len() + moved.len());
}

/// Over HTTP: a node server started later joins the ring and takes over
/// its arc.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_http_join_takes_over_arc() {
    let mut c = HttpCluster::new(2).await;
    let keys = keys(40);

    let before = c.router().ring().snapshot();
    let joined = c.start_node("late-joiner").await;
    let after = c.router().ring().snapshot();

    for key in &keys {
        c.router()
            .upload_bytes(key, Bytes::from_static(b"x"))
            .await
            .unwrap();
    }

    let gained: Vec<_> = keys
        .iter()
        .filter(|k| after.successor_of(k.as_bytes()).unwrap() == &joined)
        .collect();
    for key in &gained {
        assert_ne!(before.successor_of(key.as_bytes()).unwrap(), &joined);
    }
    assert_eq!(
        c.store(joined.name()).list().await.unwrap().len(),
        gained.len()
    );
}
