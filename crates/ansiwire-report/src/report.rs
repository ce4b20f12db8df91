use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A cursor location as reported by the terminal (1-based on real terminals).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub row: u16,
    pub column: u16,
}

/// A decoded in-band status report.
///
/// Only the cursor position and device code variants carry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    /// `ESC [ {code} 0 c`
    DeviceCode { code: u32 },
    /// `ESC [ 0 n`
    DeviceOk,
    /// `ESC [ 3 n`
    DeviceFailure,
    /// `ESC [ {row} ; {column} R`
    CursorPosition(Position),
}

/// The bare kind of a [`Report`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    DeviceCode,
    DeviceOk,
    DeviceFailure,
    CursorPosition,
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::DeviceCode { .. } => ReportKind::DeviceCode,
            Report::DeviceOk => ReportKind::DeviceOk,
            Report::DeviceFailure => ReportKind::DeviceFailure,
            Report::CursorPosition(_) => ReportKind::CursorPosition,
        }
    }

    /// The device type identifier, for [`Report::DeviceCode`].
    pub fn code(&self) -> Option<u32> {
        match self {
            Report::DeviceCode { code } => Some(*code),
            _ => None,
        }
    }

    /// The cursor location, for [`Report::CursorPosition`].
    pub fn position(&self) -> Option<Position> {
        match self {
            Report::CursorPosition(pos) => Some(*pos),
            _ => None,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::DeviceCode { code } => write!(f, "device code {code}"),
            Report::DeviceOk => f.write_str("device ok"),
            Report::DeviceFailure => f.write_str("device failure"),
            Report::CursorPosition(pos) => {
                write!(f, "cursor at row {} column {}", pos.row, pos.column)
            }
        }
    }
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::DeviceCode => "device_code",
            ReportKind::DeviceOk => "device_ok",
            ReportKind::DeviceFailure => "device_failure",
            ReportKind::CursorPosition => "cursor_position",
        }
    }
}

/// The trailing token that identifies a report sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// `0c`
    DeviceCode,
    /// `0n`
    DeviceOk,
    /// `3n`
    DeviceFailure,
    /// `R`
    CursorPosition,
}

impl Terminator {
    /// Every recognized terminator.
    pub const ALL: [Terminator; 4] = [
        Terminator::DeviceCode,
        Terminator::DeviceOk,
        Terminator::DeviceFailure,
        Terminator::CursorPosition,
    ];

    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Terminator::DeviceCode => b"0c",
            Terminator::DeviceOk => b"0n",
            Terminator::DeviceFailure => b"3n",
            Terminator::CursorPosition => b"R",
        }
    }

    pub fn from_bytes(token: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_bytes() == token)
    }
}

/// Decode a captured report body and terminator.
///
/// Returns `None` when the terminator is not one of the four report forms.
/// Numeric fields that fail to parse (garbage, empty, negative, overflow)
/// decode as zero instead of rejecting the report.
pub fn decode(body: &[u8], terminator: &[u8]) -> Option<Report> {
    let report = match Terminator::from_bytes(terminator)? {
        Terminator::DeviceCode => Report::DeviceCode {
            code: parse_or_zero(body),
        },
        Terminator::DeviceOk => Report::DeviceOk,
        Terminator::DeviceFailure => Report::DeviceFailure,
        Terminator::CursorPosition => {
            let mut parts = body.split(|b| *b == b';');
            let row = parts.next().map(parse_or_zero).unwrap_or_default();
            let column = parts.next().map(parse_or_zero).unwrap_or_default();
            Report::CursorPosition(Position { row, column })
        }
    };
    Some(report)
}

fn parse_or_zero<T: FromStr + Default>(field: &[u8]) -> T {
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}
