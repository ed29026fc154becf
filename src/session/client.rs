//! Reconnecting client session

use std::io::{BufReader, Write};

use crate::config::SessionConfig;
use crate::error::{CityError, Result};
use crate::protocol::{encode_request, read_response, Request, Response};

use super::{Backoff, Connector};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection yet, or closed by the user
    Disconnected,

    /// First connect sequence in progress
    Connecting,

    /// Ready to send
    Connected,

    /// Connection lost, retrying
    Reconnecting,

    /// Retries exhausted or interrupted (terminal)
    Failed,
}

/// A client session with bounded reconnect
pub struct Session<C: Connector, B: Backoff> {
    connector: C,
    backoff: B,
    config: SessionConfig,
    state: SessionState,

    /// Current transport; dropping it closes the socket
    stream: Option<BufReader<C::Stream>>,
}

impl<C: Connector, B: Backoff> Session<C, B> {
    pub fn new(connector: C, backoff: B, config: SessionConfig) -> Self {
        Self {
            connector,
            backoff,
            config,
            state: SessionState::Disconnected,
            stream: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Open the connection, retrying up to `max_attempts` times
    pub fn connect(&mut self) -> Result<()> {
        match self.state {
            SessionState::Connected => return Ok(()),
            SessionState::Failed => return Err(CityError::NotConnected),
            _ => {}
        }
        self.state = SessionState::Connecting;
        self.establish()
    }

    /// Send one request and wait for its response
    ///
    /// On a transport failure the session reconnects. The lost request is
    /// not resent: a successful reconnect yields `CityError::Reconnected`,
    /// an unsuccessful one `CityError::Unreachable` (session is then `Failed`).
    pub fn send(&mut self, request: &Request) -> Result<Response> {
        if self.state == SessionState::Disconnected {
            self.connect()?;
        }

        let stream = match self.stream.as_mut() {
            Some(stream) if self.state == SessionState::Connected => stream,
            _ => return Err(CityError::NotConnected),
        };

        // An unencodable request never touches the stream, so it is not a transport failure
        let bytes = match encode_request(request) {
            Ok(bytes) => bytes,
            Err(e) => return Err(CityError::InvalidArgument(format!("request not sent: {}", e))),
        };

        let outcome = write_frame(stream.get_mut(), &bytes).and_then(|_| read_response(stream));

        match outcome {
            Ok(response) => Ok(response),
            Err(e) if e.is_transport() => {
                tracing::warn!("Connection to {} lost: {}", self.connector.target(), e);
                self.teardown();
                self.state = SessionState::Reconnecting;
                self.establish()?;
                Err(CityError::Reconnected)
            }
            Err(e) => Err(e),
        }
    }

    /// Close the connection; the session may connect again later
    pub fn close(&mut self) {
        self.teardown();
        if self.state != SessionState::Failed {
            self.state = SessionState::Disconnected;
        }
    }

    fn establish(&mut self) -> Result<()> {
        let attempts = self.config.max_attempts;

        for attempt in 1..=attempts {
            match self.connector.connect() {
                Ok(stream) => {
                    self.stream = Some(BufReader::new(stream));
                    self.state = SessionState::Connected;
                    tracing::info!("Connected to server at {}", self.connector.target());
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        "Connection attempt {}/{} to {} failed: {}",
                        attempt,
                        attempts,
                        self.connector.target(),
                        e
                    );
                }
            }

            if attempt < attempts {
                if let Err(e) = self.backoff.wait(self.config.retry_delay) {
                    self.teardown();
                    self.state = SessionState::Failed;
                    return Err(e);
                }
            }
        }

        self.state = SessionState::Failed;
        Err(CityError::Unreachable { attempts })
    }

    fn teardown(&mut self) {
        self.stream = None;
    }
}

fn write_frame<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}
