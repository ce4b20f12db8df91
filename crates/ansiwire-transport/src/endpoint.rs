use std::fmt;
use std::net::TcpStream;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::Connection;

/// Where a terminal stream lives.
///
/// Textual forms:
/// - `unix:/run/term.sock` or any path starting with `/` or `.`
/// - `tcp:127.0.0.1:2323` or a bare `host:port`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Filesystem-path Unix domain socket.
    Unix(PathBuf),
    /// TCP `host:port`.
    Tcp(String),
}

impl Endpoint {
    /// Dial the endpoint (blocking).
    pub fn connect(&self) -> Result<Connection> {
        match self {
            #[cfg(unix)]
            Endpoint::Unix(path) => {
                let stream = std::os::unix::net::UnixStream::connect(path).map_err(|e| {
                    TransportError::Connect {
                        endpoint: self.to_string(),
                        source: e,
                    }
                })?;
                debug!(?path, "connected to unix domain socket");
                Ok(Connection::from_unix(stream))
            }
            #[cfg(not(unix))]
            Endpoint::Unix(_) => Err(TransportError::Connect {
                endpoint: self.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "unix domain sockets are not available on this platform",
                ),
            }),
            Endpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr.as_str()).map_err(|e| {
                    TransportError::Connect {
                        endpoint: self.to_string(),
                        source: e,
                    }
                })?;
                // Reports are a few bytes each; don't let Nagle hold queries back.
                stream.set_nodelay(true)?;
                debug!(%addr, "connected to tcp endpoint");
                Ok(Connection::from_tcp(stream))
            }
        }
    }
}

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("unix:") {
            if path.is_empty() {
                return Err(TransportError::InvalidEndpoint(s.to_string()));
            }
            return Ok(Endpoint::Unix(PathBuf::from(path)));
        }
        if let Some(addr) = s.strip_prefix("tcp:") {
            return parse_tcp(addr).ok_or_else(|| TransportError::InvalidEndpoint(s.to_string()));
        }
        if s.starts_with('/') || s.starts_with('.') {
            return Ok(Endpoint::Unix(PathBuf::from(s)));
        }
        parse_tcp(s).ok_or_else(|| TransportError::InvalidEndpoint(s.to_string()))
    }
}

fn parse_tcp(addr: &str) -> Option<Endpoint> {
    let (host, port) = addr.rsplit_once(':')?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return None;
    }
    Some(Endpoint::Tcp(addr.to_string()))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            Endpoint::Tcp(addr) => write!(f, "tcp:{addr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_forms() {
        assert_eq!(
            "unix:/tmp/term.sock".parse::<Endpoint>().unwrap(),
            Endpoint::Unix(PathBuf::from("/tmp/term.sock"))
        );
        assert_eq!(
            "tcp:127.0.0.1:2323".parse::<Endpoint>().unwrap(),
            Endpoint::Tcp("127.0.0.1:2323".to_string())
        );
    }

    #[test]
    fn parses_bare_forms() {
        assert_eq!(
            "./term.sock".parse::<Endpoint>().unwrap(),
            Endpoint::Unix(PathBuf::from("./term.sock"))
        );
        assert_eq!(
            "localhost:23".parse::<Endpoint>().unwrap(),
            Endpoint::Tcp("localhost:23".to_string())
        );
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "unix:", "localhost", "host:notaport", "tcp::80"] {
            assert!(
                matches!(bad.parse::<Endpoint>(), Err(TransportError::InvalidEndpoint(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for text in ["unix:/tmp/a.sock", "tcp:10.0.0.1:9000"] {
            let endpoint: Endpoint = text.parse().unwrap();
            assert_eq!(endpoint.to_string(), text);
        }
    }

    #[test]
    #[cfg(unix)]
    fn connect_to_missing_socket_fails_with_connect_error() {
        let endpoint = Endpoint::Unix(std::env::temp_dir().join(format!(
            "ansiwire-missing-{}.sock",
            std::process::id()
        )));
        assert!(matches!(
            endpoint.connect(),
            Err(TransportError::Connect { .. })
        ));
    }
}
