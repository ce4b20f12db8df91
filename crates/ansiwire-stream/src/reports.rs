use std::time::Duration;

use ansiwire_report::Report;
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::error::{Result, StreamError};

/// Receiving end of the report queue.
///
/// Clones share one queue: each report goes to exactly one caller. A clone
/// blocked in [`recv`](Self::recv) does not hold up `try_recv` or
/// `recv_timeout` on another clone.
#[derive(Debug, Clone)]
pub struct Reports {
    rx: Receiver<Report>,
}

impl Reports {
    pub(crate) fn new(rx: Receiver<Report>) -> Self {
        Self { rx }
    }

    /// Block until the next report. Fails once the interceptor has exited
    /// and every queued report was taken.
    pub fn recv(&self) -> Result<Report> {
        self.rx.recv().map_err(|_| StreamError::Disconnected)
    }

    /// Like [`recv`](Self::recv) with an upper bound on the wait.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Report> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => StreamError::Timeout(timeout),
            RecvTimeoutError::Disconnected => StreamError::Disconnected,
        })
    }

    /// Take a report if one is ready right now.
    pub fn try_recv(&self) -> Result<Option<Report>> {
        match self.rx.try_recv() {
            Ok(report) => Ok(Some(report)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(StreamError::Disconnected),
        }
    }

    /// Blocking iterator that ends when the interceptor exits.
    pub fn iter(&self) -> impl Iterator<Item = Report> + '_ {
        std::iter::from_fn(move || self.recv().ok())
    }
}
