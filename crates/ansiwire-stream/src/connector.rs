use ansiwire_transport::{Connection, Endpoint, Listener};
use tracing::debug;

use crate::config::InterceptConfig;
use crate::error::Result;
use crate::terminal::Terminal;

/// Dial a terminal endpoint and wrap the connection.
pub fn connect(endpoint: &Endpoint) -> Result<Terminal<Connection>> {
    connect_with_config(endpoint, &InterceptConfig::default())
}

/// Dial with explicit interceptor configuration.
pub fn connect_with_config(
    endpoint: &Endpoint,
    config: &InterceptConfig,
) -> Result<Terminal<Connection>> {
    let conn = endpoint.connect()?;
    debug!(%endpoint, transport = conn.transport_name(), "connected to terminal");
    Terminal::wrap_with_config(conn, config)
}

/// Accept one inbound terminal connection and wrap it.
pub fn accept(listener: &Listener) -> Result<Terminal<Connection>> {
    accept_with_config(listener, &InterceptConfig::default())
}

/// Accept with explicit interceptor configuration.
pub fn accept_with_config(
    listener: &Listener,
    config: &InterceptConfig,
) -> Result<Terminal<Connection>> {
    let conn = listener.accept()?;
    debug!(
        endpoint = %listener.endpoint(),
        transport = conn.transport_name(),
        "accepted terminal"
    );
    Terminal::wrap_with_config(conn, config)
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::{Read, Write};
    use std::os::unix::net::UnixStream;
    use std::path::PathBuf;
    use std::thread;
    use std::time::Duration;

    use ansiwire_report::Report;
    use ansiwire_transport::TransportError;

    use super::*;
    use crate::control::ControlSequences;
    use crate::error::StreamError;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "awc-{tag}-{}-{}",
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
    fn connect_wraps_a_unix_endpoint() {
        let dir = temp_dir("connect");
        let sock_path = dir.join("term.sock");
        let listener = std::os::unix::net::UnixListener::bind(&sock_path)
            .expect("listener should bind");

        let fake_terminal = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("listener should accept");
            let mut query = [0u8; 4];
            stream.read_exact(&mut query).expect("query should arrive");
            assert_eq!(&query, b"\x1b[5n");
            stream.write_all(b"\x1b[0n").expect("reply should send");
        });

        let mut term = connect(&Endpoint::Unix(sock_path)).expect("client should connect");
        term.query_device_status().expect("query should send");
        let report = term
            .reports()
            .recv_timeout(Duration::from_secs(5))
            .expect("status report should arrive");
        assert_eq!(report, Report::DeviceOk);

        fake_terminal.join().expect("fake terminal should finish");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn accept_wraps_an_inbound_connection() {
        let dir = temp_dir("accept");
        let path = dir.join("listen.sock");
        let listener = Listener::bind(&Endpoint::Unix(path.clone())).expect("listener should bind");

        let peer = thread::spawn(move || {
            let mut stream = UnixStream::connect(path).expect("peer should connect");
            stream.write_all(b"typed\x1b[2;3R").expect("peer should write");
        });

        let mut term = accept(&listener).expect("listener should accept");
        let reports = term.reports();
        let report = reports
            .recv_timeout(Duration::from_secs(5))
            .expect("report should arrive");
        assert_eq!(report.position().map(|p| (p.row, p.column)), Some((2, 3)));

        let mut out = Vec::new();
        term.read_to_end(&mut out).expect("clean bytes should read");
        assert_eq!(out, b"typed");

        peer.join().expect("peer should finish");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn connect_failure_is_a_transport_error() {
        let dir = temp_dir("missing");
        let err = connect(&Endpoint::Unix(dir.join("absent.sock"))).unwrap_err();
        assert!(matches!(
            err,
            StreamError::Transport(TransportError::Connect { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
