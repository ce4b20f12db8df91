use std::io::{self, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, OnceLock};
use std::thread;

use ansiwire_report::{extract, Extracted, Report};
use bytes::Bytes;
use crossbeam_channel as channel;
use tracing::{debug, trace, warn};

use crate::config::InterceptConfig;
use crate::error::{ReadFailure, Result, StreamError};
use crate::reports::Reports;

/// Lifecycle of an interceptor. Every state but `Open` is terminal.
#[derive(Debug, Clone)]
pub enum Status {
    /// The worker is still reading.
    Open,
    /// The stream returned end-of-file.
    EndOfStream,
    /// The stream returned an error. Reads surface it from now on.
    Failed(ReadFailure),
    /// The worker was asked to stop, or its reader went away.
    Stopped,
}

#[derive(Default)]
struct Shared {
    // Set exactly once, before the data sender is dropped.
    closed: OnceLock<Status>,
    stop: AtomicBool,
}

/// Owns the background worker that filters one inbound stream.
///
/// The worker reads a chunk, removes every report sequence, sends the
/// decoded reports, then sends the residual bytes (if any) as one clean
/// chunk. Both sends block until a consumer takes the value, so a stalled
/// consumer on either side stalls the whole read path.
pub struct Interceptor {
    data: Receiver<Bytes>,
    shared: Arc<Shared>,
}

impl Interceptor {
    /// Start the worker over `reader`.
    pub fn spawn<R>(reader: R, config: &InterceptConfig) -> Result<(Self, Reports)>
    where
        R: Read + Send + 'static,
    {
        let (data_tx, data_rx) = mpsc::sync_channel(config.data_capacity);
        let (report_tx, report_rx) = channel::bounded(config.report_capacity);
        let shared = Arc::new(Shared::default());

        let worker = Worker {
            reader,
            data: data_tx,
            reports: report_tx,
            shared: Arc::clone(&shared),
            chunk_size: config.chunk_size.max(1),
            idle_reads_allowed: config.poll_interval.is_some(),
        };
        thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || worker.run())
            .map_err(StreamError::Spawn)?;

        Ok((
            Self {
                data: data_rx,
                shared,
            },
            Reports::new(report_rx),
        ))
    }

    /// Wait for the next clean chunk.
    ///
    /// Returns `Ok(None)` once the stream has ended or the worker stopped,
    /// and the recorded failure on every call after a read error.
    pub fn next_chunk(&self) -> io::Result<Option<Bytes>> {
        match self.data.recv() {
            Ok(chunk) => Ok(Some(chunk)),
            Err(_) => match self.shared.closed.get() {
                Some(Status::Failed(failure)) => Err(failure.to_io_error()),
                Some(_) => Ok(None),
                None => Err(io::Error::new(
                    ErrorKind::BrokenPipe,
                    "interceptor worker exited unexpectedly",
                )),
            },
        }
    }

    /// Current lifecycle state.
    pub fn status(&self) -> Status {
        self.shared.closed.get().cloned().unwrap_or(Status::Open)
    }

    /// Ask the worker to exit before its next read.
    ///
    /// A worker blocked inside a read only notices once that read returns;
    /// set [`InterceptConfig::poll_interval`] to bound the wait.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
    }
}

impl Drop for Interceptor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("status", &self.status())
            .finish()
    }
}

struct Worker<R> {
    reader: R,
    data: SyncSender<Bytes>,
    reports: channel::Sender<Report>,
    shared: Arc<Shared>,
    chunk_size: usize,
    idle_reads_allowed: bool,
}

impl<R: Read> Worker<R> {
    fn run(mut self) {
        debug!(chunk_size = self.chunk_size, "interceptor started");
        let status = self.pump();
        match &status {
            Status::Failed(failure) => warn!(error = %failure.original(), "terminal read failed"),
            other => debug!(status = ?other, "interceptor finished"),
        }
        // Record before `self.data` drops so a reader that sees the closed
        // queue also sees the status.
        let _ = self.shared.closed.set(status);
    }

    fn pump(&mut self) -> Status {
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            if self.shared.stop.load(Ordering::SeqCst) {
                return Status::Stopped;
            }

            let n = match self.reader.read(&mut buf) {
                Ok(0) => return Status::EndOfStream,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if self.idle_reads_allowed
                        && matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    continue
                }
                Err(err) => return Status::Failed(ReadFailure(Arc::new(err))),
            };

            let Extracted { clean, reports } = extract(&buf[..n]);
            trace!(
                bytes = n,
                clean = clean.len(),
                reports = reports.len(),
                "scanned chunk"
            );

            for report in reports {
                debug!(%report, "intercepted report");
                if self.reports.send(report).is_err() {
                    trace!("no report consumers left; dropping report");
                }
            }

            if clean.is_empty() {
                continue;
            }
            if self.data.send(clean).is_err() {
                return Status::Stopped;
            }
        }
    }
}
