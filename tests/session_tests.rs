//! Session Tests
//!
//! Tests verify:
//! - Bounded retry on connect (attempt count, no wait after the last one)
//! - Interrupting the backoff ends the session
//! - Reconnect after an I/O failure without replaying the request

use std::cell::Cell;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::rc::Rc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cityvault::command::Registry;
use cityvault::network::{Server, ShutdownHandle};
use cityvault::protocol::{Request, MAX_MESSAGE_SIZE};
use cityvault::session::{
    Backoff, Connector, InterruptibleBackoff, NoBackoff, Session, SessionState,
};
use cityvault::{CityError, Config, Result, SessionConfig, Store};

// =============================================================================
// Helper Functions
// =============================================================================

fn start_server() -> (SocketAddr, ShutdownHandle, JoinHandle<()>) {
    let config = Config::builder().listen_addr("127.0.0.1:0").build();
    let store = Arc::new(Store::new(config.key_allocation));
    let registry = Arc::new(Registry::for_store(store, &config));

    let mut server = Server::new(config, registry);
    let addr = server.bind().unwrap();
    let handle = server.shutdown_handle();
    let thread = thread::spawn(move || {
        server.run().unwrap();
    });
    (addr, handle, thread)
}

fn session_config(attempts: u32) -> SessionConfig {
    SessionConfig {
        server_addr: String::new(),
        max_attempts: attempts,
        retry_delay: Duration::from_millis(10),
    }
}

/// A stream whose writes always fail
struct Broken;

impl Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::ErrorKind::ConnectionReset.into())
    }
}

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

enum TestStream {
    Broken(Broken),
    Tcp(TcpStream),
}

impl Read for TestStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            TestStream::Broken(s) => s.read(buf),
            TestStream::Tcp(s) => s.read(buf),
        }
    }
}

impl Write for TestStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            TestStream::Broken(s) => s.write(buf),
            TestStream::Tcp(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            TestStream::Broken(s) => s.flush(),
            TestStream::Tcp(s) => s.flush(),
        }
    }
}

/// Scripted connector: refuses the first `refusals` attempts, hands out
/// `broken` streams next, then real connections to `addr`
struct ScriptedConnector {
    addr: Option<SocketAddr>,
    refusals: Cell<u32>,
    broken: Cell<u32>,
    attempts: Rc<Cell<u32>>,
}

impl ScriptedConnector {
    fn new(addr: Option<SocketAddr>) -> Self {
        Self {
            addr,
            refusals: Cell::new(0),
            broken: Cell::new(0),
            attempts: Rc::new(Cell::new(0)),
        }
    }

    fn refusing(mut self, count: u32) -> Self {
        self.refusals = Cell::new(count);
        self
    }

    fn broken_first(mut self, count: u32) -> Self {
        self.broken = Cell::new(count);
        self
    }
}

impl Connector for ScriptedConnector {
    type Stream = TestStream;

    fn connect(&self) -> io::Result<TestStream> {
        self.attempts.set(self.attempts.get() + 1);

        if self.refusals.get() > 0 {
            self.refusals.set(self.refusals.get() - 1);
            return Err(io::ErrorKind::ConnectionRefused.into());
        }
        if self.broken.get() > 0 {
            self.broken.set(self.broken.get() - 1);
            return Ok(TestStream::Broken(Broken));
        }
        match self.addr {
            Some(addr) => Ok(TestStream::Tcp(TcpStream::connect(addr)?)),
            None => Err(io::ErrorKind::ConnectionRefused.into()),
        }
    }

    fn target(&self) -> String {
        "scripted".to_string()
    }
}

/// Counts waits instead of sleeping
struct CountingBackoff(Rc<Cell<u32>>);

impl Backoff for CountingBackoff {
    fn wait(&self, _delay: Duration) -> Result<()> {
        self.0.set(self.0.get() + 1);
        Ok(())
    }
}

/// Behaves like a user pressing Ctrl+C during the first wait
struct InterruptedBackoff;

impl Backoff for InterruptedBackoff {
    fn wait(&self, _delay: Duration) -> Result<()> {
        Err(CityError::Interrupted)
    }
}

// =============================================================================
// Connect Tests
// =============================================================================

#[test]
fn test_connects_after_two_refusals() {
    let (addr, shutdown, server) = start_server();

    let connector = ScriptedConnector::new(Some(addr)).refusing(2);
    let attempts = Rc::clone(&connector.attempts);
    let mut session = Session::new(connector, NoBackoff, session_config(3));

    session.connect().unwrap();
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(attempts.get(), 3);

    let response = session.send(&Request::bare("info")).unwrap();
    assert!(response.message.contains("Elements: 0"));

    session.close();
    shutdown.shutdown();
    server.join().unwrap();
}

#[test]
fn test_exhausted_attempts_fail_the_session() {
    let connector = ScriptedConnector::new(None);
    let attempts = Rc::clone(&connector.attempts);
    let waits = Rc::new(Cell::new(0));
    let mut session = Session::new(
        connector,
        CountingBackoff(Rc::clone(&waits)),
        session_config(3),
    );

    match session.connect() {
        Err(CityError::Unreachable { attempts }) => assert_eq!(attempts, 3),
        other => panic!("expected unreachable, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(attempts.get(), 3);
    // No pause after the last attempt
    assert_eq!(waits.get(), 2);
}

#[test]
fn test_failed_session_stays_failed() {
    let mut session = Session::new(ScriptedConnector::new(None), NoBackoff, session_config(1));
    assert!(session.connect().is_err());

    assert!(matches!(session.connect(), Err(CityError::NotConnected)));
    assert!(matches!(
        session.send(&Request::bare("info")),
        Err(CityError::NotConnected)
    ));
    session.close();
    assert_eq!(session.state(), SessionState::Failed);
}

#[test]
fn test_interrupt_during_backoff() {
    let connector = ScriptedConnector::new(None);
    let attempts = Rc::clone(&connector.attempts);
    let mut session = Session::new(connector, InterruptedBackoff, session_config(3));

    assert!(matches!(session.connect(), Err(CityError::Interrupted)));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(attempts.get(), 1);
}

#[test]
fn test_send_connects_lazily() {
    let (addr, shutdown, server) = start_server();

    let mut session = Session::new(ScriptedConnector::new(Some(addr)), NoBackoff, session_config(1));
    assert_eq!(session.state(), SessionState::Disconnected);

    let response = session.send(&Request::bare("show")).unwrap();
    assert_eq!(response.message, "Collection is empty.");
    assert!(session.is_connected());

    session.close();
    assert_eq!(session.state(), SessionState::Disconnected);

    shutdown.shutdown();
    server.join().unwrap();
}

// =============================================================================
// Reconnect Tests
// =============================================================================

#[test]
fn test_io_failure_reconnects_without_replay() {
    let (addr, shutdown, server) = start_server();

    let connector = ScriptedConnector::new(Some(addr)).broken_first(1);
    let attempts = Rc::clone(&connector.attempts);
    let mut session = Session::new(connector, NoBackoff, session_config(3));
    session.connect().unwrap();

    let insert = Request::texts(
        "insert",
        vec!["Oslo", "1", "2", "454", "700000", "23", "3", "1", "2"],
    );
    assert!(matches!(session.send(&insert), Err(CityError::Reconnected)));
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(attempts.get(), 2);

    // The lost insert was not replayed
    let response = session.send(&Request::bare("info")).unwrap();
    assert!(response.message.contains("Elements: 0"));

    let response = session.send(&insert).unwrap();
    assert_eq!(response.message, "City added with id 1.");

    session.close();
    shutdown.shutdown();
    server.join().unwrap();
}

#[test]
fn test_oversized_request_is_rejected_locally() {
    let (addr, shutdown, server) = start_server();

    let connector = ScriptedConnector::new(Some(addr));
    let attempts = Rc::clone(&connector.attempts);
    let mut session = Session::new(connector, NoBackoff, session_config(3));
    session.connect().unwrap();

    let huge = "M".repeat(MAX_MESSAGE_SIZE as usize + 1);
    assert!(matches!(
        session.send(&Request::single("filter_starts_with_name", huge)),
        Err(CityError::InvalidArgument(_))
    ));
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(attempts.get(), 1);

    let response = session.send(&Request::bare("info")).unwrap();
    assert!(response.message.contains("Elements: 0"));

    session.close();
    shutdown.shutdown();
    server.join().unwrap();
}

#[test]
fn test_io_failure_with_server_gone() {
    let connector = ScriptedConnector::new(None).broken_first(1);
    let mut session = Session::new(connector, NoBackoff, session_config(2));
    session.connect().unwrap();

    assert!(matches!(
        session.send(&Request::bare("info")),
        Err(CityError::Unreachable { attempts: 2 })
    ));
    assert_eq!(session.state(), SessionState::Failed);
}

// =============================================================================
// Backoff Tests
// =============================================================================

#[test]
fn test_interruptible_backoff_waits() {
    let (backoff, _canceller) = InterruptibleBackoff::new();
    assert!(backoff.wait(Duration::from_millis(5)).is_ok());
}

#[test]
fn test_canceller_interrupts_wait() {
    let (backoff, canceller) = InterruptibleBackoff::new();
    let waiter = thread::spawn(move || backoff.wait(Duration::from_secs(30)));

    thread::sleep(Duration::from_millis(20));
    canceller.cancel();

    assert!(matches!(waiter.join().unwrap(), Err(CityError::Interrupted)));
}
