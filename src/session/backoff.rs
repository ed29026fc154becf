//! Backoff between connection attempts
//!
//! Injected into `Session` so tests can run the retry logic without timers.

use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::error::{CityError, Result};

/// Waits between two connection attempts
pub trait Backoff {
    /// Block for `delay`; `Err(CityError::Interrupted)` if cancelled meanwhile
    fn wait(&self, delay: Duration) -> Result<()>;
}

/// Sleeps for the full delay unless a `Canceller` fires
pub struct InterruptibleBackoff {
    cancel_rx: Receiver<()>,
}

/// Cancels every current and future wait of its `InterruptibleBackoff`
#[derive(Clone)]
pub struct Canceller {
    cancel_tx: Sender<()>,
}

impl InterruptibleBackoff {
    pub fn new() -> (Self, Canceller) {
        let (cancel_tx, cancel_rx) = channel::bounded(1);
        (Self { cancel_rx }, Canceller { cancel_tx })
    }
}

impl Backoff for InterruptibleBackoff {
    fn wait(&self, delay: Duration) -> Result<()> {
        match self.cancel_rx.recv_timeout(delay) {
            Ok(()) => Err(CityError::Interrupted),
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Err(RecvTimeoutError::Disconnected) => {
                // No canceller left; nothing can interrupt
                std::thread::sleep(delay);
                Ok(())
            }
        }
    }
}

impl Canceller {
    /// Interrupt the session's backoff
    pub fn cancel(&self) {
        let _ = self.cancel_tx.try_send(());
    }
}

/// Never waits
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBackoff;

impl Backoff for NoBackoff {
    fn wait(&self, _delay: Duration) -> Result<()> {
        Ok(())
    }
}
