//! Transparent duplex filter for terminal streams.
//!
//! Wrap a [`Duplex`](ansiwire_transport::Duplex) stream in a [`Terminal`]:
//! writes go straight through, while a background [`Interceptor`] pulls
//! status reports out of the inbound bytes and delivers them on a separate
//! [`Reports`] queue. What the application reads is the inbound text with
//! every report removed.
//!
//! Both queues are rendezvous channels by default. A consumer that stops
//! reading throttles the worker; see [`InterceptConfig`].

pub mod config;
pub mod connector;
pub mod control;
pub mod error;
pub mod interceptor;
pub mod reports;
pub mod terminal;

pub use config::{InterceptConfig, DEFAULT_CHUNK_SIZE};
pub use connector::{accept, accept_with_config, connect, connect_with_config};
pub use control::ControlSequences;
pub use error::{ReadFailure, Result, StreamError};
pub use interceptor::{Interceptor, Status};
pub use reports::Reports;
pub use terminal::{Terminal, TerminalReader, TerminalWriter};
