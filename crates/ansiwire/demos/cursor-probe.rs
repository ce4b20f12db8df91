//! Query a terminal and read its reports while the rest of its output flows
//! through untouched.
//!
//! Run with:
//!   cargo run --example cursor-probe
//!
//! The "terminal" here is a thread on the other end of a socket pair.

#[cfg(not(unix))]
fn main() {
    eprintln!("cursor-probe needs Unix socket pairs");
}

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::io::{self, Read, Write};
    use std::os::unix::net::UnixStream;
    use std::thread;
    use std::time::Duration;

    use ansiwire::{ControlSequences, Terminal};

    let (local, mut remote) = UnixStream::pair()?;

    let terminal = thread::spawn(move || -> io::Result<()> {
        let mut buf = [0u8; 64];
        loop {
            let n = remote.read(&mut buf)?;
            if n == 0 {
                return Ok(());
            }
            match &buf[..n] {
                b"\x1b[6n" => remote.write_all(b"user typed this\x1b[24;80R")?,
                b"\x1b[5n" => remote.write_all(b"\x1b[0n and more text")?,
                _ => remote.write_all(&buf[..n])?,
            }
        }
    });

    let term = Terminal::wrap(local)?;
    let (mut reader, mut writer, reports) = term.into_split();

    // Clean output on its own thread, so the interceptor never waits on it.
    let printer = thread::spawn(move || -> io::Result<()> {
        let mut out = Vec::new();
        reader.read_to_end(&mut out)?;
        eprintln!("[clean] {:?}", String::from_utf8_lossy(&out));
        Ok(())
    });

    writer.query_cursor_position()?;
    let report = reports.recv_timeout(Duration::from_secs(2))?;
    eprintln!("[report] {report}");

    writer.query_device_status()?;
    let report = reports.recv_timeout(Duration::from_secs(2))?;
    eprintln!("[report] {report}");

    writer.close()?;
    printer.join().expect("printer thread should not panic")?;
    terminal.join().expect("terminal thread should not panic")?;
    Ok(())
}
