//! Fake terminal: accepts connections and answers status queries like a VT100.
//!
//! Run with:
//!   cargo run --example fake-terminal -- unix:/tmp/ansiwire-fake.sock
//!
//! In another terminal:
//!   cargo run --features cli -- probe unix:/tmp/ansiwire-fake.sock --query position

use std::io::{Read, Write};
use std::thread;

use ansiwire::report::sequence::{QUERY_CURSOR_POSITION, QUERY_DEVICE_CODE, QUERY_DEVICE_STATUS};
use ansiwire::transport::{Connection, Endpoint, Listener};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let endpoint: Endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "unix:/tmp/ansiwire-fake.sock".to_string())
        .parse()?;

    let listener = Listener::bind(&endpoint)?;
    eprintln!("Listening on {}", listener.endpoint());

    loop {
        let conn = listener.accept()?;
        eprintln!("Client connected ({})", conn.transport_name());
        thread::spawn(move || {
            if let Err(e) = serve(conn) {
                eprintln!("Client error: {e}");
            }
        });
    }
}

/// Answer every query found in each read. The cursor moves down one row per
/// position query so successive probes are distinguishable.
fn serve(mut conn: Connection) -> std::io::Result<()> {
    let mut row = 1u16;
    let mut buf = [0u8; 1024];
    loop {
        let n = conn.read(&mut buf)?;
        if n == 0 {
            eprintln!("Client disconnected");
            return Ok(());
        }
        for query in queries(&buf[..n]) {
            let reply = match query {
                q if q == QUERY_CURSOR_POSITION => {
                    let reply = format!("\x1b[{row};1R").into_bytes();
                    row = row.saturating_add(1);
                    reply
                }
                q if q == QUERY_DEVICE_STATUS => b"\x1b[0n".to_vec(),
                _ => b"\x1b[10c".to_vec(),
            };
            // Some screen output alongside the report.
            conn.write_all(b"$ ")?;
            conn.write_all(&reply)?;
        }
    }
}

fn queries(input: &[u8]) -> Vec<&'static [u8]> {
    let known = [QUERY_CURSOR_POSITION, QUERY_DEVICE_STATUS, QUERY_DEVICE_CODE];
    let mut found = Vec::new();
    let mut i = 0;
    while i < input.len() {
        match known.iter().find(|q| input[i..].starts_with(q)) {
            Some(q) => {
                found.push(*q);
                i += q.len();
            }
            None => i += 1,
        }
    }
    found
}
