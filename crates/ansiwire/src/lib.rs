//! Transparent filtering of VT100 status reports on terminal byte streams.
//!
//! A terminal answers queries such as "where is the cursor?" in-band, mixed
//! into whatever else it sends. ansiwire wraps the stream so those answers
//! arrive as typed [`report::Report`] values on their own queue while the
//! application reads everything else unchanged.
//!
//! # Crate Structure
//!
//! - [`transport`]: duplex stream abstraction, Unix socket and TCP endpoints
//! - [`report`]: report scanning and decoding, outbound control sequences
//! - [`stream`]: the background interceptor and the `Terminal` facade

/// Re-export transport types.
pub mod transport {
    pub use ansiwire_transport::*;
}

/// Re-export report and sequence types.
pub mod report {
    pub use ansiwire_report::*;
}

/// Re-export stream types.
pub mod stream {
    pub use ansiwire_stream::*;
}

pub use ansiwire_report::{Attribute, Position, Report};
pub use ansiwire_stream::{ControlSequences, InterceptConfig, Reports, Terminal};
