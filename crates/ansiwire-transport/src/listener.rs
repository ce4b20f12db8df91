#[cfg(unix)]
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::net::TcpListener;
#[cfg(unix)]
use std::path::Path;

use tracing::{debug, info};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::traits::Connection;

/// Accepts inbound terminal connections on an [`Endpoint`].
///
/// Unix socket files are created with mode `0600`, a stale socket at the
/// path is replaced, and the file is removed again on drop as long as it is
/// still the one this listener created.
pub struct Listener {
    inner: ListenerInner,
    endpoint: Endpoint,
}

enum ListenerInner {
    #[cfg(unix)]
    Unix {
        listener: std::os::unix::net::UnixListener,
        created_inode: (u64, u64),
    },
    Tcp(TcpListener),
}

impl Listener {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;
    /// Unix `sockaddr_un.sun_path` is 108 bytes on Linux, 104 elsewhere.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen on the endpoint.
    pub fn bind(endpoint: &Endpoint) -> Result<Self> {
        let bind_err = |source: std::io::Error| TransportError::Bind {
            endpoint: endpoint.to_string(),
            source,
        };

        let inner = match endpoint {
            #[cfg(unix)]
            Endpoint::Unix(path) => Self::bind_unix(endpoint, path)?,
            #[cfg(not(unix))]
            Endpoint::Unix(_) => {
                return Err(bind_err(std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "unix domain sockets are not available on this platform",
                )))
            }
            Endpoint::Tcp(addr) => ListenerInner::Tcp(TcpListener::bind(addr.as_str()).map_err(bind_err)?),
        };

        let endpoint = match &inner {
            ListenerInner::Tcp(listener) => listener
                .local_addr()
                .map(|addr| Endpoint::Tcp(addr.to_string()))
                .map_err(bind_err)?,
            #[cfg(unix)]
            ListenerInner::Unix { .. } => endpoint.clone(),
        };

        info!(%endpoint, "listening for terminal connections");
        Ok(Self { inner, endpoint })
    }

    #[cfg(unix)]
    fn bind_unix(endpoint: &Endpoint, path: &Path) -> Result<ListenerInner> {
        let bind_err = |source: std::io::Error| TransportError::Bind {
            endpoint: endpoint.to_string(),
            source,
        };

        let path_bytes = path.as_os_str().len();
        if path_bytes >= Self::MAX_PATH_LEN {
            return Err(TransportError::InvalidEndpoint(format!(
                "socket path too long ({path_bytes} bytes, max {}): {}",
                Self::MAX_PATH_LEN,
                path.display()
            )));
        }

        // Never remove a path that is not a socket.
        if let Ok(metadata) = std::fs::symlink_metadata(path) {
            if !metadata.file_type().is_socket() {
                return Err(bind_err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "existing path is not a unix socket",
                )));
            }
            debug!(?path, "removing stale socket");
            std::fs::remove_file(path).map_err(bind_err)?;
        }

        let listener = std::os::unix::net::UnixListener::bind(path).map_err(bind_err)?;
        std::fs::set_permissions(
            path,
            std::fs::Permissions::from_mode(Self::DEFAULT_SOCKET_MODE),
        )
        .map_err(bind_err)?;
        let created = std::fs::symlink_metadata(path).map_err(bind_err)?;

        Ok(ListenerInner::Unix {
            listener,
            created_inode: (created.dev(), created.ino()),
        })
    }

    /// Accept one incoming connection (blocking).
    pub fn accept(&self) -> Result<Connection> {
        let conn = match &self.inner {
            #[cfg(unix)]
            ListenerInner::Unix { listener, .. } => {
                let (stream, _addr) = listener.accept().map_err(TransportError::Accept)?;
                Connection::from_unix(stream)
            }
            ListenerInner::Tcp(listener) => {
                let (stream, addr) = listener.accept().map_err(TransportError::Accept)?;
                stream.set_nodelay(true)?;
                debug!(%addr, "accepted tcp peer");
                Connection::from_tcp(stream)
            }
        };
        debug!(endpoint = %self.endpoint, "accepted connection");
        Ok(conn)
    }

    /// The bound endpoint. For TCP this carries the resolved port.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let (ListenerInner::Unix { created_inode, .. }, Endpoint::Unix(path)) =
            (&self.inner, &self.endpoint)
        {
            let (expected_dev, expected_ino) = *created_inode;
            if let Ok(metadata) = std::fs::symlink_metadata(path) {
                if metadata.file_type().is_socket()
                    && metadata.dev() == expected_dev
                    && metadata.ino() == expected_ino
                {
                    debug!(?path, "cleaning up socket file");
                    let _ = std::fs::remove_file(path);
                } else {
                    debug!(?path, "socket path identity changed; skipping cleanup");
                }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ansiwire-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn bind_accept_connect_unix() {
        let dir = temp_dir("listener");
        let endpoint = Endpoint::Unix(dir.join("term.sock"));

        let listener = Listener::bind(&endpoint).unwrap();

        let dial = endpoint.clone();
        let handle = std::thread::spawn(move || {
            let mut client = dial.connect().unwrap();
            client.write_all(b"hello").unwrap();
        });

        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        handle.join().unwrap();

        let Endpoint::Unix(path) = &endpoint else {
            unreachable!()
        };
        let mode = std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        drop(listener);
        assert!(!path.exists(), "socket file should be cleaned up on drop");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bind_tcp_resolves_port() {
        let listener = Listener::bind(&Endpoint::Tcp("127.0.0.1:0".to_string())).unwrap();
        let Endpoint::Tcp(addr) = listener.endpoint() else {
            panic!("expected tcp endpoint");
        };
        assert!(!addr.ends_with(":0"));

        let dial = listener.endpoint().clone();
        let handle = std::thread::spawn(move || dial.connect().unwrap());
        let _server = listener.accept().unwrap();
        let _client = handle.join().unwrap();
    }

    #[test]
    fn bind_rejects_existing_non_socket_file() {
        let dir = temp_dir("listener-file");
        let path = dir.join("not-a-socket.sock");
        std::fs::write(&path, b"regular-file").unwrap();

        let result = Listener::bind(&Endpoint::Unix(path.clone()));
        assert!(matches!(result, Err(TransportError::Bind { .. })));
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bind_rejects_overlong_path() {
        let long_path = "/tmp/".to_string() + &"a".repeat(200) + ".sock";
        let result = Listener::bind(&Endpoint::Unix(long_path.into()));
        assert!(matches!(result, Err(TransportError::InvalidEndpoint(_))));
    }

    #[test]
    fn drop_does_not_remove_replaced_path() {
        let dir = temp_dir("listener-replaced");
        let path = dir.join("drop.sock");

        let listener = Listener::bind(&Endpoint::Unix(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::write(&path, b"replacement-file").unwrap();

        drop(listener);
        assert!(path.exists(), "drop must not remove a replaced path");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
