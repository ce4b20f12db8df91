use std::time::Duration;

/// Largest chunk the interceptor pulls from the stream in one read.
pub const DEFAULT_CHUNK_SIZE: usize = 0xffff;

/// Configuration for the background interceptor.
#[derive(Debug, Clone)]
pub struct InterceptConfig {
    /// Read buffer size. Reports are only recognized within one chunk.
    pub chunk_size: usize,
    /// Clean chunks that may queue before the worker blocks. `0` is a rendezvous.
    pub data_capacity: usize,
    /// Reports that may queue before the worker blocks. `0` is a rendezvous.
    pub report_capacity: usize,
    /// Read timeout applied to the stream so the worker can notice a stop
    /// request while idle. A timed-out read is not an error. `None` blocks.
    pub poll_interval: Option<Duration>,
    /// Name of the worker thread.
    pub thread_name: String,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            data_capacity: 0,
            report_capacity: 0,
            poll_interval: None,
            thread_name: "ansiwire-intercept".to_string(),
        }
    }
}
