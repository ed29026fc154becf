//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polled)
//! - One worker thread per connection
//! - Requests routed through the command `Registry`

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::{Connection, UNENCODABLE_RESPONSE};
