//! Per-client connection
//!
//! One `Connection` serves one socket: read a request, dispatch it through
//! the registry, write the response, repeat until the peer goes away.

use std::io::{self, BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::command::Registry;
use crate::error::{CityError, Result};
use crate::protocol::{read_request, write_response, Request, Response};

/// Sent instead of a response that does not fit in one message
pub const UNENCODABLE_RESPONSE: &str = "response exceeds message size limit";

/// What the next read produced
enum Incoming {
    Request(Request),

    /// Peer closed, reset, or went idle past the read timeout
    Closed(&'static str),
}

/// A served client socket
pub struct Connection {
    requests: BufReader<TcpStream>,
    responses: BufWriter<TcpStream>,
    registry: Arc<Registry>,
    peer: String,

    /// Requests answered so far
    served: u64,
}

impl Connection {
    /// Wrap an accepted socket
    ///
    /// Disables Nagle: every response is a single small write the client
    /// is blocked on.
    pub fn new(stream: TcpStream, registry: Arc<Registry>) -> Result<Self> {
        let peer = match stream.peer_addr() {
            Ok(addr) => addr.to_string(),
            Err(_) => "unknown peer".to_string(),
        };
        stream.set_nodelay(true)?;

        Ok(Self {
            requests: BufReader::new(stream.try_clone()?),
            responses: BufWriter::new(stream),
            registry,
            peer,
            served: 0,
        })
    }

    /// Apply socket timeouts in milliseconds; 0 means wait forever
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let millis = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        self.requests.get_ref().set_read_timeout(millis(read_ms))?;
        self.responses.get_ref().set_write_timeout(millis(write_ms))?;
        Ok(())
    }

    /// Serve requests until the client leaves
    ///
    /// A client that disconnects (cleanly or not) or idles out is a normal
    /// end. A request that cannot be decoded gets one error response, after
    /// which the stream position is lost and the connection is dropped. A
    /// response too large to encode is replaced by an error response and the
    /// connection keeps going.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Serving {}", self.peer);

        loop {
            let request = match self.next_request() {
                Ok(Incoming::Request(request)) => request,
                Ok(Incoming::Closed(reason)) => {
                    tracing::debug!(
                        "{} {} after {} requests",
                        self.peer,
                        reason,
                        self.served
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Unreadable request from {}: {}", self.peer, e);
                    let _ = self.send_response(Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::info!(
                peer = %self.peer,
                command = %request.command_name,
                args = request.arguments.len(),
                "Request"
            );
            let response = self.registry.dispatch(&request);
            tracing::trace!("Reply to {}: {:?}", self.peer, response.message);

            match self.send_response(response) {
                Ok(()) => self.served += 1,
                Err(CityError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("{} left before its response was written", self.peer);
                    return Ok(());
                }
                Err(e @ CityError::Io(_)) => {
                    tracing::warn!("Cannot reply to {}: {}", self.peer, e);
                    return Err(e);
                }
                // Encoding failed before anything was written; the stream is still in sync
                Err(e) => {
                    tracing::warn!("Response for {} not encodable: {}", self.peer, e);
                    self.send_response(Response::error(UNENCODABLE_RESPONSE))?;
                    self.served += 1;
                }
            }
        }
    }

    fn next_request(&mut self) -> Result<Incoming> {
        match read_request(&mut self.requests) {
            Ok(Some(request)) => Ok(Incoming::Request(request)),
            Ok(None) => Ok(Incoming::Closed("disconnected")),
            Err(CityError::Io(e)) if is_disconnect(e.kind()) => {
                Ok(Incoming::Closed("dropped the connection"))
            }
            // Unix reports an expired read timeout as WouldBlock, Windows as TimedOut
            Err(CityError::Io(e))
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
            {
                Ok(Incoming::Closed("idled out"))
            }
            Err(e) => Err(e),
        }
    }

    /// Write one response and flush it
    pub fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.responses, &response)
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer
    }

    /// Requests answered on this connection
    pub fn served(&self) -> u64 {
        self.served
    }
}

fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}
