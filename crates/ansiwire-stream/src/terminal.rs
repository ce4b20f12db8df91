use std::io::{self, Read, Write};
use std::mem;

use ansiwire_transport::Duplex;
use bytes::{Buf, Bytes};
use tracing::debug;

use crate::config::InterceptConfig;
use crate::error::Result;
use crate::interceptor::{Interceptor, Status};
use crate::reports::Reports;

/// A duplex stream with status reports filtered out of its inbound side.
///
/// Writes go straight to the wrapped stream. Reads return the inbound bytes
/// with every report sequence removed; the decoded reports are available
/// from [`reports`](Self::reports).
///
/// With the default rendezvous queues the background worker cannot make
/// progress while a report or a clean chunk is waiting for a taker. Code
/// that expects both should consume them from different threads, for
/// example after [`into_split`](Self::into_split).
pub struct Terminal<S: Duplex> {
    reader: TerminalReader,
    writer: TerminalWriter<S>,
    reports: Reports,
}

/// The filtered read side of a [`Terminal`].
pub struct TerminalReader {
    interceptor: Interceptor,
    // Unread tail of the last chunk handed out.
    pending: Bytes,
}

/// The write side of a [`Terminal`].
pub struct TerminalWriter<S> {
    stream: S,
}

impl<S: Duplex> Terminal<S> {
    /// Wrap `stream` with the default configuration.
    pub fn wrap(stream: S) -> Result<Self> {
        Self::wrap_with_config(stream, &InterceptConfig::default())
    }

    /// Wrap `stream` and start its interceptor.
    pub fn wrap_with_config(stream: S, config: &InterceptConfig) -> Result<Self> {
        if config.poll_interval.is_some() {
            stream.set_read_timeout(config.poll_interval)?;
        }
        let half = stream.read_half()?;
        let (interceptor, reports) = Interceptor::spawn(half, config)?;
        debug!(
            chunk_size = config.chunk_size,
            data_capacity = config.data_capacity,
            report_capacity = config.report_capacity,
            "terminal wrapped"
        );

        Ok(Self {
            reader: TerminalReader {
                interceptor,
                pending: Bytes::new(),
            },
            writer: TerminalWriter { stream },
            reports,
        })
    }

    /// A handle on the report queue. Clones share the queue.
    pub fn reports(&self) -> Reports {
        self.reports.clone()
    }

    pub fn status(&self) -> Status {
        self.reader.status()
    }

    /// Ask the interceptor to exit. See [`Interceptor::stop`].
    pub fn stop(&self) {
        self.reader.stop();
    }

    /// Stop the interceptor and close the underlying stream.
    pub fn close(&mut self) -> io::Result<()> {
        self.reader.stop();
        self.writer.close()
    }

    /// Next clean chunk as delivered by the interceptor, or `None` at end of
    /// stream. Bytes left over from a short [`read`](Read::read) come first.
    pub fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        self.reader.read_chunk()
    }

    pub fn get_ref(&self) -> &S {
        self.writer.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut S {
        self.writer.get_mut()
    }

    /// Separate the read side, the write side and the report queue so they
    /// can live on different threads.
    ///
    /// Once every [`Reports`] handle is dropped the interceptor discards
    /// reports instead of waiting for a taker.
    pub fn into_split(self) -> (TerminalReader, TerminalWriter<S>, Reports) {
        (self.reader, self.writer, self.reports)
    }
}

impl<S: Duplex> Read for Terminal<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<S: Duplex> Write for Terminal<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<S: Duplex> std::fmt::Debug for Terminal<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("status", &self.status())
            .field("pending", &self.reader.pending.len())
            .finish()
    }
}

impl TerminalReader {
    pub fn status(&self) -> Status {
        self.interceptor.status()
    }

    pub fn stop(&self) {
        self.interceptor.stop();
    }

    /// See [`Terminal::read_chunk`].
    pub fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        if !self.pending.is_empty() {
            return Ok(Some(mem::take(&mut self.pending)));
        }
        self.interceptor.next_chunk()
    }
}

impl Read for TerminalReader {
    /// Copies from at most one chunk. End of stream and a stopped
    /// interceptor both read as `Ok(0)`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pending.is_empty() {
            match self.interceptor.next_chunk()? {
                Some(chunk) => self.pending = chunk,
                None => return Ok(0),
            }
        }

        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        Ok(n)
    }
}

impl std::fmt::Debug for TerminalReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalReader")
            .field("status", &self.status())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<S: Duplex> TerminalWriter<S> {
    /// Close the underlying stream in both directions.
    pub fn close(&mut self) -> io::Result<()> {
        self.stream.close()
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S: Duplex> Write for TerminalWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl<S> std::fmt::Debug for TerminalWriter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalWriter").finish_non_exhaustive()
    }
}
