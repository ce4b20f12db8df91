use std::io::{self, Write};

use ansiwire_report::sequence::{
    self, Attribute, CURSOR_HIDE, CURSOR_SHOW, DISABLE_LINE_WRAP, ENABLE_LINE_WRAP, ERASE_SCREEN,
    QUERY_CURSOR_POSITION, QUERY_DEVICE_CODE, QUERY_DEVICE_STATUS,
};

/// Convenience senders for queries and display commands.
///
/// Implemented for every [`Write`], so a [`Terminal`](crate::Terminal), a
/// [`TerminalWriter`](crate::TerminalWriter), or a plain socket can use them.
/// Each call writes one complete sequence and flushes.
pub trait ControlSequences: Write {
    /// `ESC [ 6 n`; answered with a cursor position report.
    fn query_cursor_position(&mut self) -> io::Result<()> {
        send(self, QUERY_CURSOR_POSITION)
    }

    /// `ESC [ 5 n`; answered with device OK or device failure.
    fn query_device_status(&mut self) -> io::Result<()> {
        send(self, QUERY_DEVICE_STATUS)
    }

    /// `ESC [ c`; answered with a device code report.
    fn query_device_code(&mut self) -> io::Result<()> {
        send(self, QUERY_DEVICE_CODE)
    }

    fn goto(&mut self, row: u16, column: u16) -> io::Result<()> {
        send(self, &sequence::goto(row, column))
    }

    fn set(&mut self, attrs: &[Attribute]) -> io::Result<()> {
        send(self, &sequence::set(attrs))
    }

    fn erase_screen(&mut self) -> io::Result<()> {
        send(self, ERASE_SCREEN)
    }

    fn cursor_hide(&mut self) -> io::Result<()> {
        send(self, CURSOR_HIDE)
    }

    fn cursor_show(&mut self) -> io::Result<()> {
        send(self, CURSOR_SHOW)
    }

    fn enable_line_wrap(&mut self) -> io::Result<()> {
        send(self, ENABLE_LINE_WRAP)
    }

    fn disable_line_wrap(&mut self) -> io::Result<()> {
        send(self, DISABLE_LINE_WRAP)
    }
}

impl<W: Write + ?Sized> ControlSequences for W {}

fn send<W: Write + ?Sized>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}
