//! VT100 status reports: scanning, decoding, and the outbound vocabulary.
//!
//! Inbound, a terminal answers queries with in-band reports embedded in its
//! ordinary output:
//! - `ESC [ {code} 0 c` device code
//! - `ESC [ 0 n` / `ESC [ 3 n` device OK / failure
//! - `ESC [ {row} ; {col} R` cursor position
//!
//! [`scan`] finds them in a chunk, [`decode`] turns one into a [`Report`],
//! and [`extract`] does both and hands back the residual bytes.
//!
//! Outbound, [`sequence`] builds the queries and display commands.

pub mod error;
pub mod report;
pub mod scanner;
pub mod sequence;

pub use error::{Result, SequenceError};
pub use report::{decode, Position, Report, ReportKind, Terminator};
pub use scanner::{extract, scan, Extracted, Match};
pub use sequence::{goto, set, Attribute, ESC};
