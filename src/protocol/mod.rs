//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (self-delimiting bincode)
//!
//! Each message is one bincode-encoded value written straight onto the
//! stream. bincode knows where a value ends, so there is no length header:
//!
//! ```text
//! client ──► Request  { command_name, arguments }
//! client ◄── Response { message, data? }
//! ```
//!
//! The server reads exactly one Request, writes exactly one Response, and
//! loops. The client keeps at most one Request in flight.
//!
//! ### Arguments
//! - `None`:   `info`, `show`, `clear`, `average_of_meters_above_sea_level`
//! - `Single`: `remove_key`, `remove_*_key`, `remove_all_by_standard_of_living`,
//!             `filter_starts_with_name`
//! - `List`:   `insert`, `update` (text fields), `replace_if_greater` (key + city)

mod request;
mod response;
mod codec;

pub use request::{Argument, Arguments, Request};
pub use response::Response;
pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response, MAX_MESSAGE_SIZE,
};
