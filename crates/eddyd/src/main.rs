//! `eddyd` — the Eddy daemon.
//!
//! Builds a consistent hash ring from configuration, seeds it, and serves it
//! over HTTP.
//!
//! # Usage
//!
//! ```text
//! eddyd start                                  # 3 replicas, Node1..Node3 on 0.0.0.0:8080
//! eddyd start -c eddy.toml                     # start with a config file
//! eddyd start -l 127.0.0.1:9090 --seed a --seed b --replicas 64
//! eddyd lookup alpha beta                      # print owners without serving
//! eddyd distribution -n 100000                 # key share per node
//! ```

mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use eddy_cluster::Membership;
use eddy_http::{RingServer, RingServerConfig};
use eddy_placement::{HashAlgorithm, Ring};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "eddyd", version, about = "Consistent hash ring daemon")]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the ring and serve the HTTP API until interrupted.
    Start {
        /// Override HTTP listen address (e.g. "127.0.0.1:9090").
        #[arg(short = 'l', long, env = "EDDY_LISTEN_ADDR")]
        listen_addr: Option<String>,

        #[command(flatten)]
        ring: RingArgs,
    },

    /// Print the owner of each key on the configured ring.
    Lookup {
        /// Keys to resolve.
        #[arg(required = true)]
        keys: Vec<String>,

        #[command(flatten)]
        ring: RingArgs,
    },

    /// Hash synthetic keys and report each node's share.
    Distribution {
        /// Number of keys to hash.
        #[arg(short = 'n', long, default_value = "10000")]
        count: usize,

        #[command(flatten)]
        ring: RingArgs,
    },
}

/// Ring overrides shared by every subcommand.
#[derive(Args, Default)]
struct RingArgs {
    /// Seed node identifier; replaces the configured seeds. Repeatable.
    #[arg(short, long = "seed")]
    seeds: Vec<String>,

    /// Virtual positions per node.
    #[arg(short, long, env = "EDDY_REPLICAS")]
    replicas: Option<u16>,

    /// Hash function: "blake3" or "fnv1a".
    #[arg(long, env = "EDDY_HASH")]
    hash: Option<HashAlgorithm>,
}

impl RingArgs {
    /// CLI args override config file values.
    fn apply(self, config: &mut CliConfig) {
        if !self.seeds.is_empty() {
            config.bootstrap.seeds = self.seeds;
        }
        if let Some(replicas) = self.replicas {
            config.ring.replicas = replicas;
        }
        if let Some(hash) = self.hash {
            config.ring.hash = hash;
        }
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
        Commands::Start { listen_addr, ring } => {
            ring.apply(&mut config);
            if let Some(addr) = listen_addr {
                config.node.listen_addr = addr;
            }
            cmd_start(config).await
        }
        Commands::Lookup { keys, ring } => {
            ring.apply(&mut config);
            cmd_lookup(&config, &keys)
        }
        Commands::Distribution { count, ring } => {
            ring.apply(&mut config);
            cmd_distribution(&config, count)
        }
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Build the configured ring and add the seed nodes.
fn seeded_membership(config: &CliConfig) -> Result<Arc<Membership>> {
    let ring = config.build_ring().context("invalid ring configuration")?;
    let membership = Membership::new(ring);
    membership.bootstrap(config.bootstrap.seeds.iter().cloned());
    Ok(membership)
}

// -----------------------------------------------------------------------
// eddyd start
// -----------------------------------------------------------------------

async fn cmd_start(config: CliConfig) -> Result<()> {
    info!("starting eddyd");
    info!(
        listen_addr = %config.node.listen_addr,
        replicas = config.ring.replicas,
        hash = %config.ring.hash,
        seeds = config.bootstrap.seeds.len(),
        "ring configuration"
    );

    let membership = seeded_membership(&config)?;
    if membership.nodes().is_empty() {
        warn!("starting with an empty ring; lookups return 404 until a node is added");
    }

    tokio::spawn(log_ring_events(membership.clone()));

    let server = RingServer::new(RingServerConfig { membership });
    server
        .serve_with_shutdown(&config.node.listen_addr, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("eddyd stopped");
    Ok(())
}

/// Log every membership change along with the resulting ring size.
async fn log_ring_events(membership: Arc<Membership>) {
    let mut rx = membership.subscribe();
    loop {
        match rx.recv().await {
            Ok(event) => {
                let ring = membership.ring();
                debug!(
                    node = %event.node(),
                    ?event,
                    nodes = ring.node_count(),
                    vnodes = ring.vnode_count(),
                    "ring membership changed"
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "ring event log fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Resolve once Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(%e, "failed to listen for ctrl-c, shutting down");
        return;
    }
    info!("shutdown signal received, draining connections");
}

// -----------------------------------------------------------------------
// eddyd lookup
// -----------------------------------------------------------------------

fn cmd_lookup(config: &CliConfig, keys: &[String]) -> Result<()> {
    let membership = seeded_membership(config)?;
    for key in keys {
        match membership.node_for_key(key) {
            Some(node) => println!("{key} -> {node}"),
            None => println!("{key} -> (no owner: ring is empty)"),
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// eddyd distribution
// -----------------------------------------------------------------------

fn cmd_distribution(config: &CliConfig, count: usize) -> Result<()> {
    let ring = seeded_membership(config)?.ring().snapshot();
    let counts = key_distribution(&ring, count);

    if counts.is_empty() {
        println!("Ring is empty.");
        return Ok(());
    }

    println!(
        "{count} keys over {} nodes ({} replicas each, {} hash):",
        counts.len(),
        ring.replica_count(),
        config.ring.hash
    );
    let ideal = 100.0 / counts.len() as f64;
    for (node, n) in &counts {
        let share = *n as f64 * 100.0 / count.max(1) as f64;
        println!("  {node:<24} {n:>10} {share:>6.2}% (ideal {ideal:.2}%)");
    }
    Ok(())
}

/// Count how many of `count` synthetic keys (`key-0`, `key-1`, ...) each
/// member owns. Members owning no keys are listed with zero.
fn key_distribution(ring: &Ring, count: usize) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = ring
        .members()
        .into_iter()
        .map(|node| (node.into_identifier(), 0))
        .collect();

    for i in 0..count {
        if let Some(node) = ring.lookup(&format!("key-{i}")) {
            *counts.entry(node.identifier().to_string()).or_default() += 1;
        }
    }
    counts
}
