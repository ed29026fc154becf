//! # CityVault
//!
//! A client/server manager for a collection of city records:
//! - Shared in-memory store behind a single lock
//! - Named commands dispatched through a registry
//! - Self-delimiting bincode request/response protocol over TCP
//! - Client sessions that reconnect with bounded retries
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │        Client Shell  →  Session (connect / reconnect)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Request / Response (bincode)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one worker per connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Command Registry                            │
//! │            (name → handler closure)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐        ┌──────────────┐
//!               │    Store     │ ◄───── │   Snapshot   │
//!               │   (Mutex)    │  load  │    (JSON)    │
//!               └──────────────┘        └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod store;
pub mod snapshot;
pub mod protocol;
pub mod command;
pub mod network;
pub mod session;
pub mod shell;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CityError, Result};
pub use config::{Config, KeyAllocation, SessionConfig};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CityVault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
