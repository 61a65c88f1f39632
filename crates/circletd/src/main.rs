//! `circletd`: the Circlet daemon and client.
//!
//! One binary plays both roles: `serve` runs a storage node, every other
//! command routes keys over the configured ring.
//!
//! # Usage
//!
//! ```text
//! circletd serve                               # run a storage node
//! circletd serve -d ./node2 -l 127.0.0.1:1232  # second instance
//! circletd -c circlet.toml ring                # list ring members by slot
//! circletd assign docs/a.txt docs/b.txt        # show which node owns each key
//! circletd upload ./report.pdf                 # send a local file to its owner
//! circletd fetch ./report.pdf -o copy.pdf      # read it back
//! circletd plan --add d=10.0.0.4 k1 k2 k3      # preview keys moved by a change
//! circletd benchmark -N 8 -n 1000              # in-memory routing benchmark
//! ```

mod config;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use circlet_net::{HttpTransport, MemoryTransport};
use circlet_node::{NodeServer, NodeServerConfig};
use circlet_placement::{Ring, SharedRing};
use circlet_router::Router;
use circlet_store::{ContentStore, FileStore, MemoryStore};
use circlet_types::Node;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "circletd",
    version,
    about = "Circlet consistent-hash content router"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true, env = "CIRCLET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a storage node.
    Serve {
        /// Override data directory (useful for running multiple instances).
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Override listen address (e.g. "127.0.0.1:1232").
        #[arg(short = 'l', long)]
        listen_addr: Option<String>,

        /// Keep content in memory (no disk persistence).
        #[arg(short, long)]
        memory: bool,
    },

    /// List ring members in slot order.
    Ring,

    /// Show the node owning each key.
    Assign {
        /// Keys to resolve.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Upload local files to the nodes owning their paths.
    Upload {
        /// Local file paths. Each path string is also the key.
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Fetch content from the node owning a path.
    Fetch {
        /// Key to fetch.
        path: String,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview which keys would move if a node joined or left.
    Plan {
        /// Node to add, as `NAME=HOST`.
        #[arg(long, value_parser = parse_node, conflicts_with = "remove")]
        add: Option<Node>,

        /// Name of the node to remove.
        #[arg(long)]
        remove: Option<String>,

        /// Keys to check.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Run a quick upload/fetch benchmark over in-memory nodes.
    Benchmark {
        /// Number of nodes on the ring.
        #[arg(short = 'N', long, default_value = "4")]
        nodes: usize,

        /// Number of objects to write and read.
        #[arg(short = 'n', long, default_value = "100")]
        count: usize,

        /// Size of each object in bytes.
        #[arg(short, long, default_value = "10240")]
        size: usize,
    },
}

fn parse_node(s: &str) -> Result<Node, String> {
    match s.split_once('=') {
        Some((name, host)) if !name.is_empty() && !host.is_empty() => Ok(Node::new(name, host)),
        _ => Err(format!("expected NAME=HOST, got {s:?}")),
    }
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    match cli.command {
        Commands::Serve {
            data_dir,
            listen_addr,
            memory,
        } => {
            // CLI args override config file values.
            if let Some(dir) = data_dir {
                config.server.data_dir = dir;
            }
            if let Some(addr) = listen_addr {
                config.server.listen_addr = addr;
            }
            if memory {
                config.server.backend = "memory".to_string();
            }
            cmd_serve(config).await
        }
        Commands::Ring => cmd_ring(&config),
        Commands::Assign { keys } => cmd_assign(&config, &keys),
        Commands::Upload { paths } => cmd_upload(&config, &paths).await,
        Commands::Fetch { path, output } => cmd_fetch(&config, &path, output).await,
        Commands::Plan { add, remove, keys } => cmd_plan(&config, add, remove, &keys),
        Commands::Benchmark {
            nodes,
            count,
            size,
        } => cmd_benchmark(&config, nodes, count, size).await,
    }
}

fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_router(config: &CliConfig) -> Result<Router> {
    let ring = config.build_ring().context("invalid ring configuration")?;
    let transport =
        HttpTransport::new(config.transport_config()).context("failed to build HTTP client")?;
    Ok(Router::new(SharedRing::new(ring), Arc::new(transport)))
}

// -----------------------------------------------------------------------
// circletd serve
// -----------------------------------------------------------------------

fn open_store(config: &CliConfig) -> Result<Arc<dyn ContentStore>> {
    match config.server.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new(config.max_bytes()))),
        "file" => {
            let store = FileStore::new(&config.server.data_dir).with_context(|| {
                format!(
                    "failed to open data directory {}",
                    config.server.data_dir.display()
                )
            })?;
            Ok(Arc::new(store))
        }
        other => bail!("unknown storage backend {other:?} (expected \"file\" or \"memory\")"),
    }
}

async fn cmd_serve(config: CliConfig) -> Result<()> {
    info!(
        listen_addr = %config.server.listen_addr,
        backend = %config.server.backend,
        data_dir = %config.server.data_dir.display(),
        "starting storage node"
    );

    let store = open_store(&config)?;
    let server = NodeServer::new(NodeServerConfig::new(store));

    server
        .serve_with_shutdown(
            &config.server.listen_addr,
            wait_for_shutdown(tokio::signal::ctrl_c()),
        )
        .await
        .with_context(|| format!("storage node failed on {}", config.server.listen_addr))?;

    info!("storage node stopped");
    Ok(())
}

/// Resolve once `signal` fires.
///
/// If the signal handler cannot be installed the node keeps running; it
/// can then only be stopped by killing the process.
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "failed to listen for shutdown signal; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

// -----------------------------------------------------------------------
// circletd ring / assign / plan
// -----------------------------------------------------------------------

fn cmd_ring(config: &CliConfig) -> Result<()> {
    let ring = config.build_ring().context("invalid ring configuration")?;
    let hasher = config.hasher()?;

    println!(
        "ring: {} node(s), hash {}, modulus {}",
        ring.len(),
        hasher.algorithm(),
        config.ring.modulus.as_deref().unwrap_or("2^256"),
    );
    for entry in ring.entries() {
        println!("  {:#x}  {}", entry.slot, entry.node);
    }
    Ok(())
}

fn cmd_assign(config: &CliConfig, keys: &[String]) -> Result<()> {
    let ring = config.build_ring().context("invalid ring configuration")?;
    for key in keys {
        let node = ring.successor_of(key.as_bytes())?;
        println!("{key}\t{node}");
    }
    Ok(())
}

/// Apply a proposed membership change to a copy of `ring`.
fn proposed_ring(ring: &Ring, add: Option<Node>, remove: Option<&str>) -> Result<Ring> {
    let mut next = ring.clone();
    match (add, remove) {
        (Some(node), None) => {
            next.insert(node)?;
        }
        (None, Some(name)) => {
            let node = ring
                .nodes()
                .find(|n| n.name() == name)
                .cloned()
                .with_context(|| format!("no node named {name:?} on the ring"))?;
            next.remove(&node)?;
        }
        _ => bail!("pass exactly one of --add or --remove"),
    }
    Ok(next)
}

fn cmd_plan(
    config: &CliConfig,
    add: Option<Node>,
    remove: Option<String>,
    keys: &[String],
) -> Result<()> {
    let current = config.build_ring().context("invalid ring configuration")?;
    let next = proposed_ring(&current, add, remove.as_deref())?;
    let moved = Ring::diff(&current, &next, keys);

    for r in &moved {
        println!("{}\t{} -> {}", r.key, r.from, r.to);
    }
    println!("{} of {} key(s) move", moved.len(), keys.len());
    Ok(())
}

// -----------------------------------------------------------------------
// circletd upload / fetch
// -----------------------------------------------------------------------

async fn cmd_upload(config: &CliConfig, paths: &[String]) -> Result<()> {
    let router = build_router(config)?;
    for path in paths {
        let node = router.assign(path)?;
        let receipt = router
            .upload(path)
            .await
            .with_context(|| format!("upload of {path} to {node} failed"))?;
        println!("{path}\t{node}\t{} bytes", receipt.size);
    }
    Ok(())
}

async fn cmd_fetch(config: &CliConfig, path: &str, output: Option<PathBuf>) -> Result<()> {
    let router = build_router(config)?;
    let content = router
        .fetch(path)
        .await
        .with_context(|| format!("fetch of {path} failed"))?;

    match output {
        Some(out) => {
            tokio::fs::write(&out, &content)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            eprintln!("wrote {} bytes to {}", content.len(), out.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&content)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// circletd benchmark
// -----------------------------------------------------------------------

async fn cmd_benchmark(config: &CliConfig, nodes: usize, count: usize, size: usize) -> Result<()> {
    if nodes == 0 {
        bail!("benchmark needs at least one node");
    }

    println!("Circlet Benchmark");
    println!("  nodes:   {nodes}");
    println!("  objects: {count}");
    println!("  size:    {size} bytes each");
    println!("  hash:    {}", config.ring.hash);
    println!();

    // In-memory setup, so this measures routing and store overhead only.
    let hasher = Arc::new(config.hasher()?);
    let transport = Arc::new(MemoryTransport::new());
    let mut ring = Ring::new(hasher);
    let mut stores = Vec::with_capacity(nodes);
    for i in 0..nodes {
        let node = Node::new(format!("bench-{i}"), format!("10.0.{}.{}", i / 256, i % 256));
        let store = Arc::new(MemoryStore::new(u64::MAX));
        transport.register(&node, store.clone()).await;
        ring.insert(node.clone())?;
        stores.push((node, store));
    }
    let router = Router::new(SharedRing::new(ring), transport);

    let payload = Bytes::from(vec![0xABu8; size]);
    let keys: Vec<String> = (0..count).map(|i| format!("bench/obj-{i:06}")).collect();

    let start = Instant::now();
    for key in &keys {
        router.upload_bytes(key, payload.clone()).await?;
    }
    let upload_elapsed = start.elapsed();

    let start = Instant::now();
    for key in &keys {
        let data = router.fetch(key).await?;
        if data.len() != size {
            bail!("{key}: expected {size} bytes, got {}", data.len());
        }
    }
    let fetch_elapsed = start.elapsed();

    let total_mb = total_megabytes(count, size);
    println!(
        "Upload: {count} objects in {:.3}s ({:.1} MB/s, {:.0} ops/s)",
        upload_elapsed.as_secs_f64(),
        total_mb / upload_elapsed.as_secs_f64(),
        count as f64 / upload_elapsed.as_secs_f64(),
    );
    println!(
        "Fetch:  {count} objects in {:.3}s ({:.1} MB/s, {:.0} ops/s)",
        fetch_elapsed.as_secs_f64(),
        total_mb / fetch_elapsed.as_secs_f64(),
        count as f64 / fetch_elapsed.as_secs_f64(),
    );

    println!();
    println!("Distribution:");
    let mut per_node = BTreeMap::new();
    for (node, store) in &stores {
        per_node.insert(node.name().to_string(), store.list().await?.len());
    }
    for (name, n) in per_node {
        let pct = if count == 0 {
            0.0
        } else {
            n as f64 * 100.0 / count as f64
        };
        println!("  {name:<12} {n:>8} ({pct:.1}%)");
    }

    Ok(())
}

fn total_megabytes(count: usize, size: usize) -> f64 {
    count as f64 * size as f64 / (1024.0 * 1024.0)
}
