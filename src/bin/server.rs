//! CityVault Server Binary
//!
//! Loads the initial collection and starts the TCP server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use cityvault::command::Registry;
use cityvault::network::Server;
use cityvault::{snapshot, Config, KeyAllocation, Store};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing_subscriber::{fmt, EnvFilter};

/// CityVault Server
#[derive(Parser, Debug)]
#[command(name = "cityvault-server")]
#[command(about = "Concurrent city collection server")]
#[command(version)]
struct Args {
    /// JSON snapshot to load before accepting clients
    snapshot: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:12345")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Key generation policy for inserts
    #[arg(short, long, value_enum, default_value = "smallest-free")]
    keys: KeyPolicy,

    /// Required prefix length for filter_starts_with_name (0 = any length)
    #[arg(long, default_value = "1")]
    prefix_len: usize,

    /// Idle read timeout per connection in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KeyPolicy {
    SmallestFree,
    Monotonic,
}

impl From<KeyPolicy> for KeyAllocation {
    fn from(policy: KeyPolicy) -> Self {
        match policy {
            KeyPolicy::SmallestFree => KeyAllocation::SmallestFree,
            KeyPolicy::Monotonic => KeyAllocation::Monotonic,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cityvault=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("CityVault Server v{}", cityvault::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let mut builder = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .key_allocation(args.keys.into())
        .filter_prefix_len(Some(args.prefix_len).filter(|&n| n > 0))
        .read_timeout_ms(args.read_timeout_ms);
    if let Some(path) = &args.snapshot {
        builder = builder.snapshot_path(path);
    }
    let config = builder.build();

    // Load the initial collection; failure here is fatal
    let store = Arc::new(Store::new(config.key_allocation));
    match &config.snapshot_path {
        Some(path) => {
            if let Err(e) = snapshot::load(path, &store) {
                tracing::error!("Failed to load snapshot: {}", e);
                std::process::exit(1);
            }
        }
        None => tracing::info!("No snapshot given, starting with an empty collection"),
    }

    tracing::info!(
        "Store ready: {} records, key allocation {:?}",
        store.len(),
        store.key_allocation()
    );

    let registry = Arc::new(Registry::for_store(Arc::clone(&store), &config));

    let mut server = Server::new(config, registry);
    if let Err(e) = server.bind() {
        tracing::error!("Failed to start server: {}", e);
        std::process::exit(1);
    }

    // SIGINT / SIGTERM stop the accept loop
    let shutdown = server.shutdown_handle();
    match Signals::new([SIGINT, SIGTERM]) {
        Ok(mut signals) => {
            std::thread::spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    tracing::info!("Received signal {}, initiating shutdown...", signal);
                    shutdown.shutdown();
                }
            });
        }
        Err(e) => tracing::warn!("Signal handlers unavailable: {}", e),
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped with {} records", store.len());
}
