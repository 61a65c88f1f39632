//! Shared test harness for Circlet integration tests.
//!
//! Provides two clusters that put a [`Router`] in front of N storage nodes:
//!
//! - [`TestCluster`]: nodes are in-process [`MemoryStore`]s reached through
//!   a [`MemoryTransport`], with failure injection.
//! - [`HttpCluster`]: every node is a real [`NodeServer`] on an ephemeral
//!   localhost port, reached through [`HttpTransport`].
//!
//! Both hash node hosts with SHA-256 over the full 2^256 slot space.

use std::sync::Arc;

use circlet_net::{HttpTransport, HttpTransportConfig, MemoryTransport};
use circlet_node::{NodeServer, NodeServerConfig};
use circlet_placement::{DigestHasher, HashAlgorithm, HashFunction, Ring, SharedRing};
use circlet_router::Router;
use circlet_store::{ContentStore, MemoryStore};
use circlet_types::Node;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Capacity of every test node's store.
const MAX_BYTES: u64 = 64 * 1024 * 1024;

fn sha256() -> Arc<dyn HashFunction> {
    Arc::new(DigestHasher::full_range(HashAlgorithm::Sha256))
}

// =========================================================================
// In-memory cluster
// =========================================================================

/// N nodes behind a [`MemoryTransport`].
pub struct TestCluster {
    router: Router,
    transport: Arc<MemoryTransport>,
    nodes: Vec<(Node, Arc<MemoryStore>)>,
    next_id: usize,
}

impl TestCluster {
    /// Create a cluster of `n` nodes, all on the ring.
    pub async fn new(n: usize) -> Self {
        let transport = Arc::new(MemoryTransport::new());
        let ring = SharedRing::new(Ring::new(sha256()));
        let mut cluster = Self {
            router: Router::new(ring, transport.clone()),
            transport,
            nodes: Vec::new(),
            next_id: 0,
        };
        for _ in 0..n {
            cluster.add_node().await;
        }
        cluster
    }

    /// Start a new node and put it on the ring. Returns the node.
    pub async fn add_node(&mut self) -> Node {
        let id = self.next_id;
        self.next_id += 1;

        let node = Node::new(format!("node-{id}"), format!("10.1.{}.{}", id / 256, id % 256));
        let store = Arc::new(MemoryStore::new(MAX_BYTES));
        self.transport.register(&node, store.clone()).await;
        self.router
            .ring()
            .insert(node.clone())
            .expect("test node hosts do not collide");
        self.nodes.push((node.clone(), store));
        node
    }

    /// Take a node off the ring. Its store keeps whatever it held.
    pub fn remove_node(&self, name: &str) -> Node {
        let node = self.node(name).clone();
        self.router.ring().remove(&node).unwrap();
        node
    }

    /// Make a node unreachable (or reachable again) without touching the ring.
    pub async fn set_down(&self, name: &str, down: bool) {
        self.transport.set_down(self.node(name), down).await;
    }

    /// The router in front of the cluster.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> &Node {
        &self
            .nodes
            .iter()
            .find(|(n, _)| n.name() == name)
            .unwrap_or_else(|| panic!("no node named {name}"))
            .0
    }

    /// Every node ever started, in start order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().map(|(n, _)| n)
    }

    /// The store behind a node.
    pub fn store(&self, name: &str) -> &Arc<MemoryStore> {
        &self
            .nodes
            .iter()
            .find(|(n, _)| n.name() == name)
            .unwrap_or_else(|| panic!("no node named {name}"))
            .1
    }

    /// Number of paths stored on a node.
    pub async fn stored_count(&self, name: &str) -> usize {
        self.store(name).list().await.unwrap().len()
    }

    /// Total paths stored across every node.
    pub async fn total_stored(&self) -> usize {
        let mut total = 0;
        for (_, store) in &self.nodes {
            total += store.list().await.unwrap().len();
        }
        total
    }
}

// =========================================================================
// HTTP cluster
// =========================================================================

struct RunningNode {
    node: Node,
    store: Arc<MemoryStore>,
    handle: Option<JoinHandle<Result<(), std::io::Error>>>,
}

/// N real storage node servers on localhost, routed over HTTP.
pub struct HttpCluster {
    router: Router,
    nodes: Vec<RunningNode>,
}

impl HttpCluster {
    /// Start `n` node servers and put them all on the ring.
    pub async fn new(n: usize) -> Self {
        let ring = SharedRing::new(Ring::new(sha256()));
        let transport = HttpTransport::new(HttpTransportConfig::default()).unwrap();
        let mut cluster = Self {
            router: Router::new(ring, Arc::new(transport)),
            nodes: Vec::new(),
        };
        for i in 0..n {
            cluster.start_node(&format!("http-{i}")).await;
        }
        cluster
    }

    /// Start one more node server and put it on the ring.
    pub async fn start_node(&mut self, name: &str) -> Node {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = Arc::new(MemoryStore::new(MAX_BYTES));
        let server = NodeServer::new(NodeServerConfig::new(store.clone()));
        let handle = tokio::spawn(server.serve_listener(listener));

        let node = Node::new(name, addr.to_string());
        self.router.ring().insert(node.clone()).unwrap();
        self.nodes.push(RunningNode {
            node: node.clone(),
            store,
            handle: Some(handle),
        });
        node
    }

    /// Stop a node's server. The node stays on the ring.
    ///
    /// Only reliable for nodes the router has not talked to yet, since
    /// already-accepted connections outlive the listener.
    pub async fn stop_node(&mut self, name: &str) {
        let running = self
            .nodes
            .iter_mut()
            .find(|r| r.node.name() == name)
            .unwrap_or_else(|| panic!("no node named {name}"));
        if let Some(handle) = running.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }

    /// The router in front of the cluster.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Every node started, in start order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().map(|r| &r.node)
    }

    /// The store behind a node's server.
    pub fn store(&self, name: &str) -> &Arc<MemoryStore> {
        &self
            .nodes
            .iter()
            .find(|r| r.node.name() == name)
            .unwrap_or_else(|| panic!("no node named {name}"))
            .store
    }
}

impl Drop for HttpCluster {
    fn drop(&mut self) {
        for running in &mut self.nodes {
            if let Some(handle) = running.handle.take() {
                handle.abort();
            }
        }
    }
}

// =========================================================================
// Test data
// =========================================================================

/// Generate deterministic, non-repeating test data with a seed.
pub fn test_data_seeded(size: usize, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = seed;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

/// `count` distinct keys shaped like object paths.
pub fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("objects/{i:04}.bin")).collect()
}
