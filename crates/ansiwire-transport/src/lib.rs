//! Duplex byte-stream transports.
//!
//! ansiwire wraps anything that can read, write and close. This crate names
//! that capability ([`Duplex`]) and provides the concrete streams the rest of
//! the workspace dials or accepts:
//! - Unix domain sockets (Linux/macOS)
//! - TCP sockets
//!
//! This is the lowest layer of ansiwire. Everything else builds on top of
//! the [`Duplex`] trait and the [`Connection`] type provided here.

pub mod endpoint;
pub mod error;
pub mod listener;
pub mod traits;

pub use endpoint::Endpoint;
pub use error::{Result, TransportError};
pub use listener::Listener;
pub use traits::{Connection, Duplex};
