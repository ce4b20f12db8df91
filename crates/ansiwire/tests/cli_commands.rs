#![cfg(all(unix, feature = "cli"))]

use std::io::{self, Read, Write};
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::process::Command;
use std::thread;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/awcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

#[test]
fn watch_passes_text_through_and_prints_reports() {
    let dir = unique_temp_dir("watch");
    let sock_path = dir.join("term.sock");
    let listener = UnixListener::bind(&sock_path).expect("listener should bind");
    let terminal = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("listener should accept");
        stream
            .write_all(b"hello \x1b[0nworld\x1b[5;6R\n")
            .expect("terminal should write");
        // Closing ends the watch.
    });

    let output = Command::new(env!("CARGO_BIN_EXE_ansiwire"))
        .arg("--format")
        .arg("raw")
        .arg("watch")
        .arg(format!("unix:{}", sock_path.display()))
        .output()
        .expect("watch should run");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hello world\n"), "stdout: {stdout}");
    assert!(stdout.contains("ok\n"));
    assert!(stdout.contains("5 6\n"));
    assert!(!stdout.contains('\x1b'));

    terminal.join().expect("terminal should finish");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn watch_count_stops_early() {
    let dir = unique_temp_dir("watch-count");
    let sock_path = dir.join("term.sock");
    let listener = UnixListener::bind(&sock_path).expect("listener should bind");
    let terminal = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("listener should accept");
        stream
            .write_all(b"\x1b[1;1R")
            .expect("terminal should write");
        // Stay connected; the client leaves on its own.
        let _ = io::copy(&mut stream, &mut io::sink());
    });

    let output = Command::new(env!("CARGO_BIN_EXE_ansiwire"))
        .arg("watch")
        .arg(format!("unix:{}", sock_path.display()))
        .arg("--count")
        .arg("1")
        .arg("--format")
        .arg("json")
        .output()
        .expect("watch should run");

    assert!(output.status.success());
    let line = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(line.trim()).expect("watch should emit json");
    assert_eq!(payload["kind"], "cursor_position");
    assert_eq!(payload["row"], 1);

    terminal.join().expect("terminal should finish");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn emit_writes_sequences_in_order() {
    let dir = unique_temp_dir("emit");
    let sock_path = dir.join("term.sock");
    let listener = UnixListener::bind(&sock_path).expect("listener should bind");
    let terminal = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("listener should accept");
        let mut received = Vec::new();
        stream
            .read_to_end(&mut received)
            .expect("terminal should read");
        received
    });

    let output = Command::new(env!("CARGO_BIN_EXE_ansiwire"))
        .arg("--format")
        .arg("json")
        .arg("emit")
        .arg(format!("unix:{}", sock_path.display()))
        .arg("--erase")
        .arg("--goto")
        .arg("2,5")
        .arg("--set")
        .arg("bright,green")
        .arg("--line-wrap")
        .arg("off")
        .arg("--text")
        .arg("ready")
        .output()
        .expect("emit should run");

    assert!(output.status.success());
    let received = terminal.join().expect("terminal should finish");
    assert_eq!(received, b"\x1b[2J\x1b[2;5f\x1b[1;32m\x1b[7lready");

    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("emit should emit json");
    assert_eq!(payload["bytes_written"], received.len());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn emit_rejects_unknown_attribute() {
    let output = Command::new(env!("CARGO_BIN_EXE_ansiwire"))
        .arg("emit")
        .arg("unix:/tmp/ansiwire-never-used.sock")
        .arg("--set")
        .arg("chartreuse")
        .output()
        .expect("emit should run");

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("chartreuse"));
}

#[test]
fn bad_endpoint_is_a_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_ansiwire"))
        .arg("probe")
        .arg("not-an-endpoint")
        .output()
        .expect("probe should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_ansiwire"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("ansiwire {}", env!("CARGO_PKG_VERSION"))
    );
}
