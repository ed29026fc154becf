//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! Messages are bincode values (varint integers, little endian) written
//! back to back. Every read and write is capped at `MAX_MESSAGE_SIZE`, so a
//! corrupt length inside a message cannot make the peer allocate unbounded
//! memory.

use std::io::{self, BufRead, Read, Write};

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CityError, Result};
use super::{Request, Response};

/// Maximum encoded message size (16 MB)
pub const MAX_MESSAGE_SIZE: u64 = 16 * 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_MESSAGE_SIZE)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(options().serialize(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(options().deserialize(bytes)?)
}

fn write_message<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    let bytes = encode(value)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    encode(request)
}

/// Decode a request from exactly one encoded message
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    decode(bytes)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    encode(response)
}

/// Decode a response from exactly one encoded message
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    decode(bytes)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read the next request from a stream
///
/// Returns `Ok(None)` when the peer closed the stream between messages.
/// A stream that ends inside a message is a protocol error.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<Request>> {
    if reader.fill_buf()?.is_empty() {
        return Ok(None);
    }

    match options().deserialize_from(reader) {
        Ok(request) => Ok(Some(request)),
        Err(e) => {
            if let bincode::ErrorKind::Io(io) = e.as_ref() {
                if io.kind() == io::ErrorKind::UnexpectedEof {
                    return Err(CityError::Protocol(
                        "stream ended in the middle of a request".to_string(),
                    ));
                }
            }
            Err(e.into())
        }
    }
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    write_message(writer, request)
}

/// Read one response from a stream (blocks until complete)
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    Ok(options().deserialize_from(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    write_message(writer, response)
}
