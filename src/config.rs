//! Configuration for CityVault
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a CityVault server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// JSON snapshot loaded into the store before accepting connections
    pub snapshot_path: Option<PathBuf>,

    /// How the store picks a key when `insert` does not supply one
    pub key_allocation: KeyAllocation,

    /// Required prefix length for `filter_starts_with_name` (`None` = any non-empty)
    pub filter_prefix_len: Option<usize>,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = wait forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = wait forever)
    pub write_timeout_ms: u64,
}

/// Key generation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAllocation {
    /// Smallest positive integer not currently in use (freed keys come back)
    SmallestFree,

    /// One past the largest key ever handed out (an id is never reused)
    Monotonic,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            key_allocation: KeyAllocation::SmallestFree,
            filter_prefix_len: Some(1),
            listen_addr: "127.0.0.1:12345".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot file loaded at startup
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = Some(path.into());
        self
    }

    /// Set the key allocation policy
    pub fn key_allocation(mut self, policy: KeyAllocation) -> Self {
        self.config.key_allocation = policy;
        self
    }

    /// Set the required prefix length for name filtering
    pub fn filter_prefix_len(mut self, len: Option<usize>) -> Self {
        self.config.filter_prefix_len = len;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Client-side session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server address (host:port)
    pub server_addr: String,

    /// Connection attempts per connect sequence
    pub max_attempts: u32,

    /// Pause between two attempts
    pub retry_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:12345".to_string(),
            max_attempts: 3,
            retry_delay: Duration::from_millis(300),
        }
    }
}
