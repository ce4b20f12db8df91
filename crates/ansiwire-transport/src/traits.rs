use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// A blocking duplex byte stream: read, write and close.
///
/// The read side is handed to a background worker via [`Duplex::read_half`]
/// while the original value keeps serving writes and `close`. For sockets the
/// read half is a cloned descriptor, so closing the original unblocks a read
/// pending on the half.
pub trait Duplex: Read + Write {
    /// Independent reader over the same stream.
    type ReadHalf: Read + Send + 'static;

    /// Obtain a reader that can be moved to another thread.
    fn read_half(&self) -> io::Result<Self::ReadHalf>;

    /// Close the stream in both directions.
    fn close(&mut self) -> io::Result<()>;

    /// Bound blocking reads on the read half. `None` blocks indefinitely.
    fn set_read_timeout(&self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }
}

impl Duplex for TcpStream {
    type ReadHalf = TcpStream;

    fn read_half(&self) -> io::Result<Self::ReadHalf> {
        self.try_clone()
    }

    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

#[cfg(unix)]
impl Duplex for std::os::unix::net::UnixStream {
    type ReadHalf = std::os::unix::net::UnixStream;

    fn read_half(&self) -> io::Result<Self::ReadHalf> {
        self.try_clone()
    }

    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        std::os::unix::net::UnixStream::set_read_timeout(self, timeout)
    }
}

/// A connected socket, either Unix domain or TCP.
///
/// This is the stream type returned by [`Endpoint::connect`] and
/// [`Listener::accept`].
///
/// [`Endpoint::connect`]: crate::Endpoint::connect
/// [`Listener::accept`]: crate::Listener::accept
pub struct Connection {
    inner: ConnectionInner,
}

enum ConnectionInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    Tcp(TcpStream),
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.read(buf),
            ConnectionInner::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.write(buf),
            ConnectionInner::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.flush(),
            ConnectionInner::Tcp(stream) => stream.flush(),
        }
    }
}

impl Duplex for Connection {
    type ReadHalf = Connection;

    fn read_half(&self) -> io::Result<Self::ReadHalf> {
        self.try_clone()
    }

    fn close(&mut self) -> io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.shutdown(Shutdown::Both),
            ConnectionInner::Tcp(stream) => stream.shutdown(Shutdown::Both),
        }
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match &self.inner {
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.set_read_timeout(timeout),
            ConnectionInner::Tcp(stream) => stream.set_read_timeout(timeout),
        }
    }
}

impl Connection {
    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: ConnectionInner::Unix(stream),
        }
    }

    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: ConnectionInner::Tcp(stream),
        }
    }

    /// Try to clone this connection (creates a new file descriptor).
    pub fn try_clone(&self) -> io::Result<Self> {
        match &self.inner {
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.try_clone().map(Self::from_unix),
            ConnectionInner::Tcp(stream) => stream.try_clone().map(Self::from_tcp),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            #[cfg(unix)]
            ConnectionInner::Unix(_) => "unix-domain-socket",
            ConnectionInner::Tcp(_) => "tcp",
        }
    }
}

#[cfg(unix)]
impl From<std::os::unix::net::UnixStream> for Connection {
    fn from(stream: std::os::unix::net::UnixStream) -> Self {
        Self::from_unix(stream)
    }
}

impl From<TcpStream> for Connection {
    fn from(stream: TcpStream) -> Self {
        Self::from_tcp(stream)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("type", &self.transport_name())
            .finish()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::net::UnixStream;

    use super::*;

    #[test]
    fn read_half_sees_bytes_written_by_peer() {
        let (left, right) = UnixStream::pair().unwrap();
        let mut writer = Connection::from(left);
        let reader_owner = Connection::from(right);

        let mut half = reader_owner.read_half().unwrap();
        writer.write_all(b"hello").unwrap();

        let mut buf = [0u8; 5];
        half.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn close_unblocks_pending_read_on_half() {
        let (left, _right) = UnixStream::pair().unwrap();
        let mut conn = Connection::from(left);
        let mut half = conn.read_half().unwrap();

        let reader = std::thread::spawn(move || {
            let mut buf = [0u8; 8];
            half.read(&mut buf)
        });

        conn.close().unwrap();
        let n = reader.join().unwrap().unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn read_timeout_applies_to_half() {
        let (left, _right) = UnixStream::pair().unwrap();
        let conn = Connection::from(left);
        Duplex::set_read_timeout(&conn, Some(Duration::from_millis(10))).unwrap();

        let mut half = conn.read_half().unwrap();
        let mut buf = [0u8; 1];
        let err = half.read(&mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
        ));
    }

    #[test]
    fn debug_names_transport() {
        let (left, _right) = UnixStream::pair().unwrap();
        let conn = Connection::from(left);
        assert_eq!(format!("{conn:?}"), "Connection { type: \"unix-domain-socket\" }");
    }

    #[test]
    fn tcp_connection_roundtrip() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = std::thread::spawn(move || {
            let mut conn = Connection::from(TcpStream::connect(addr).unwrap());
            conn.write_all(b"ping").unwrap();
            conn
        });

        let (server, _) = listener.accept().unwrap();
        let mut server = Connection::from(server);
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
        assert_eq!(server.transport_name(), "tcp");

        let _ = client.join().unwrap();
    }
}
