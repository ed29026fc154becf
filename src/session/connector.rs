//! Transport factory used by `Session`

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Opens a fresh byte stream to the server
pub trait Connector {
    type Stream: Read + Write;

    fn connect(&self) -> io::Result<Self::Stream>;

    /// Where this connector points, for diagnostics
    fn target(&self) -> String;
}

/// Connects over TCP
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
    io_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            io_timeout: None,
        }
    }

    /// Fail reads and writes that stall longer than `timeout`
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = Some(timeout);
        self
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(&self.addr)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.io_timeout)?;
        stream.set_write_timeout(self.io_timeout)?;
        Ok(stream)
    }

    fn target(&self) -> String {
        self.addr.clone()
    }
}
