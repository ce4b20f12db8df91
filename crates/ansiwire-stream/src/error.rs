use std::sync::Arc;
use std::time::Duration;

/// Errors that can occur while wrapping a stream or waiting on reports.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] ansiwire_transport::TransportError),

    /// The background interceptor thread could not be started.
    #[error("failed to spawn interceptor thread: {0}")]
    Spawn(std::io::Error),

    /// An I/O error on the wrapped stream.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No report arrived in time.
    #[error("no report within {0:?}")]
    Timeout(Duration),

    /// The interceptor has exited; no more reports will arrive.
    #[error("report stream ended")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, StreamError>;

/// The first read error seen on the wrapped stream.
///
/// [`Terminal`](crate::Terminal) reads return it inside an `io::Error` with
/// the original kind, on every call once the buffered data is drained.
#[derive(Debug, Clone, thiserror::Error)]
#[error("terminal read failed: {0}")]
pub struct ReadFailure(#[source] pub Arc<std::io::Error>);

impl ReadFailure {
    /// The error the transport returned.
    pub fn original(&self) -> &std::io::Error {
        &self.0
    }

    pub(crate) fn to_io_error(&self) -> std::io::Error {
        std::io::Error::new(self.0.kind(), self.clone())
    }
}
