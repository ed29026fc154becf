//! TCP Server
//!
//! Accepts connections and hands each one to its own worker thread.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};

use crate::command::Registry;
use crate::config::Config;
use crate::error::{CityError, Result};
use crate::protocol::{write_response, Response};

use super::Connection;

/// How long the acceptor waits between polls of a quiet listener
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// TCP server for CityVault
pub struct Server {
    config: Config,
    registry: Arc<Registry>,
    listener: Option<TcpListener>,

    /// Cleared by `shutdown`; the accept loop exits once it sees false
    running: Arc<AtomicBool>,

    /// Wakes the acceptor out of its poll sleep
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,

    /// Connections currently being served
    active: Arc<AtomicUsize>,

    workers: Vec<JoinHandle<()>>,
}

/// Stops a running server from another thread
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    wake: Sender<()>,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting and return from `run`
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.wake.try_send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Decrements the active-connection count when a worker ends
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Server {
    /// Create a new server with the given config and command registry
    pub fn new(config: Config, registry: Arc<Registry>) -> Self {
        let (wake_tx, wake_rx) = channel::bounded(1);
        Self {
            config,
            registry,
            listener: None,
            running: Arc::new(AtomicBool::new(true)),
            wake_tx,
            wake_rx,
            active: Arc::new(AtomicUsize::new(0)),
            workers: Vec::new(),
        }
    }

    /// Bind the listen address (called by `run` if not done already)
    ///
    /// Returns the bound address, which is useful when listening on port 0.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            CityError::Config(format!("cannot bind {}: {}", self.config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Get a handle that can stop this server
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: Arc::clone(&self.running),
            wake: self.wake_tx.clone(),
        }
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => return Err(CityError::Config("listener not bound".to_string())),
        };

        tracing::info!("Server listening on {}", listener.local_addr()?);

        while self.running.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    tracing::info!("Client connected: {}", peer);
                    if let Err(e) = self.spawn_worker(stream) {
                        tracing::warn!("Failed to start session for {}: {}", peer, e);
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    // Returns early when shutdown() pushes a wake-up
                    let _ = self.wake_rx.recv_timeout(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // A failed accept only affects that one peer
                    tracing::warn!("Accept failed: {}", e);
                    let _ = self.wake_rx.recv_timeout(ACCEPT_POLL_INTERVAL);
                }
            }
            self.workers.retain(|worker| !worker.is_finished());
        }

        drop(listener);
        self.reap_workers();
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown_handle().shutdown();
    }

    fn spawn_worker(&mut self, stream: TcpStream) -> Result<()> {
        // Some platforms hand out accepted sockets in the listener's mode
        stream.set_nonblocking(false)?;

        if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!(
                "Rejecting connection: {} sessions already active",
                self.config.max_connections
            );
            let mut stream = stream;
            let _ = write_response(
                &mut stream,
                &Response::error("server is at its connection limit"),
            );
            return Ok(());
        }

        let mut connection = Connection::new(stream, Arc::clone(&self.registry))?;
        connection.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;

        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveGuard(Arc::clone(&self.active));

        let worker = thread::Builder::new()
            .name(format!("session-{}", connection.peer_addr()))
            .spawn(move || {
                let _guard = guard;
                if let Err(e) = connection.handle() {
                    tracing::warn!("Session {} ended with error: {}", connection.peer_addr(), e);
                }
                tracing::info!(
                    "Connection closed with {} ({} requests served)",
                    connection.peer_addr(),
                    connection.served()
                );
            })?;
        self.workers.push(worker);
        Ok(())
    }

    /// Join finished workers; sessions still open keep running detached
    fn reap_workers(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) =
            self.workers.drain(..).partition(|w| w.is_finished());
        for worker in finished {
            let _ = worker.join();
        }
        if !running.is_empty() {
            tracing::info!("{} sessions still open at shutdown", running.len());
        }
    }
}
