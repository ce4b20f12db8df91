//! Outbound control sequences: queries and display commands.
//!
//! These are plain byte strings; nothing here touches a stream.
//!
//! ```text
//! query cursor position   ESC [ 6 n          -> ESC [ {row} ; {col} R
//! query device status     ESC [ 5 n          -> ESC [ 0 n | ESC [ 3 n
//! query device code       ESC [ c            -> ESC [ {code} 0 c
//! move cursor             ESC [ {row} ; {col} f
//! display attributes      ESC [ {a1} ; ... ; {an} m
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::SequenceError;

/// The escape byte that opens every sequence.
pub const ESC: u8 = 0x1b;

pub const QUERY_CURSOR_POSITION: &[u8] = b"\x1b[6n";
pub const QUERY_DEVICE_STATUS: &[u8] = b"\x1b[5n";
pub const QUERY_DEVICE_CODE: &[u8] = b"\x1b[c";
pub const ERASE_SCREEN: &[u8] = b"\x1b[2J";
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
pub const ENABLE_LINE_WRAP: &[u8] = b"\x1b[7h";
pub const DISABLE_LINE_WRAP: &[u8] = b"\x1b[7l";

/// Force the cursor to `row`, `column`.
pub fn goto(row: u16, column: u16) -> Vec<u8> {
    format!("\x1b[{row};{column}f").into_bytes()
}

/// Set display attributes. An empty list resets the terminal's defaults.
pub fn set(attrs: &[Attribute]) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 + attrs.len() * 3);
    out.extend_from_slice(&[ESC, b'[']);
    for (i, attr) in attrs.iter().enumerate() {
        if i > 0 {
            out.push(b';');
        }
        out.extend_from_slice(attr.code().to_string().as_bytes());
    }
    out.push(b'm');
    out
}

/// Display attribute (SGR parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Reset,
    Bright,
    Dim,
    Italic,
    Underscore,
    Blink,
    Reverse,
    Hidden,

    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,

    BlackBg,
    RedBg,
    GreenBg,
    YellowBg,
    BlueBg,
    MagentaBg,
    CyanBg,
    WhiteBg,
}

impl Attribute {
    pub const ALL: [Attribute; 24] = [
        Attribute::Reset,
        Attribute::Bright,
        Attribute::Dim,
        Attribute::Italic,
        Attribute::Underscore,
        Attribute::Blink,
        Attribute::Reverse,
        Attribute::Hidden,
        Attribute::Black,
        Attribute::Red,
        Attribute::Green,
        Attribute::Yellow,
        Attribute::Blue,
        Attribute::Magenta,
        Attribute::Cyan,
        Attribute::White,
        Attribute::BlackBg,
        Attribute::RedBg,
        Attribute::GreenBg,
        Attribute::YellowBg,
        Attribute::BlueBg,
        Attribute::MagentaBg,
        Attribute::CyanBg,
        Attribute::WhiteBg,
    ];

    /// The numeric SGR code.
    pub fn code(self) -> u8 {
        match self {
            Attribute::Reset => 0,
            Attribute::Bright => 1,
            Attribute::Dim => 2,
            Attribute::Italic => 3,
            Attribute::Underscore => 4,
            Attribute::Blink => 5,
            Attribute::Reverse => 7,
            Attribute::Hidden => 8,
            Attribute::Black => 30,
            Attribute::Red => 31,
            Attribute::Green => 32,
            Attribute::Yellow => 33,
            Attribute::Blue => 34,
            Attribute::Magenta => 35,
            Attribute::Cyan => 36,
            Attribute::White => 37,
            Attribute::BlackBg => 40,
            Attribute::RedBg => 41,
            Attribute::GreenBg => 42,
            Attribute::YellowBg => 43,
            Attribute::BlueBg => 44,
            Attribute::MagentaBg => 45,
            Attribute::CyanBg => 46,
            Attribute::WhiteBg => 47,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Reset => "reset",
            Attribute::Bright => "bright",
            Attribute::Dim => "dim",
            Attribute::Italic => "italic",
            Attribute::Underscore => "underscore",
            Attribute::Blink => "blink",
            Attribute::Reverse => "reverse",
            Attribute::Hidden => "hidden",
            Attribute::Black => "black",
            Attribute::Red => "red",
            Attribute::Green => "green",
            Attribute::Yellow => "yellow",
            Attribute::Blue => "blue",
            Attribute::Magenta => "magenta",
            Attribute::Cyan => "cyan",
            Attribute::White => "white",
            Attribute::BlackBg => "black-bg",
            Attribute::RedBg => "red-bg",
            Attribute::GreenBg => "green-bg",
            Attribute::YellowBg => "yellow-bg",
            Attribute::BlueBg => "blue-bg",
            Attribute::MagentaBg => "magenta-bg",
            Attribute::CyanBg => "cyan-bg",
            Attribute::WhiteBg => "white-bg",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.code() == code)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a name (`red`, `blue-bg`, `BlueBG`, `underline`) or an SGR code.
impl FromStr for Attribute {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || SequenceError::UnknownAttribute(s.to_string());
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code).ok_or_else(unknown);
        }

        let folded: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "bold" => return Ok(Attribute::Bright),
            "underline" => return Ok(Attribute::Underscore),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|a| a.name().replace('-', "") == folded)
            .ok_or_else(unknown)
    }
}
