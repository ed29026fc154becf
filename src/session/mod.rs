//! Session Module
//!
//! Client-side connection lifecycle.
//!
//! ## State machine
//! ```text
//!  Disconnected ──connect()──► Connecting ──ok──► Connected ◄─────┐
//!                                  │                  │           │ ok
//!                           attempts exhausted   I/O failure      │
//!                                  ▼                  ▼           │
//!                               Failed ◄──exhausted── Reconnecting┘
//! ```
//!
//! - Each connect sequence makes at most `max_attempts` attempts with
//!   `retry_delay` between them (never after the last one)
//! - A request lost to an I/O failure is not replayed; after a successful
//!   reconnect `send` returns `CityError::Reconnected` so the caller can ask
//!   the user to resubmit
//! - An interrupted backoff ends the session at once (`Failed`)

mod backoff;
mod client;
mod connector;

pub use backoff::{Backoff, Canceller, InterruptibleBackoff, NoBackoff};
pub use client::{Session, SessionState};
pub use connector::{Connector, TcpConnector};
