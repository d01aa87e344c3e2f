//! UART exposed over TCP.
//!
//! Each accepted connection stands in for one serial line: bytes written
//! by the host arrive on the link's receive path, and frames the link
//! writes go back to the host.  The socket is non-blocking so a poll with
//! nothing pending returns immediately.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};

use log::{debug, info, warn};

use crate::protocol::transport::Transport;

/// Times a partially written frame is retried before giving up.
const WRITE_RETRIES: u32 = 200;

/// Peek window used by `available()`.
const PEEK_WINDOW: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpUartError {
    /// The peer closed the connection.
    Disconnected,
    /// The socket buffer stayed full for the whole retry budget.
    WouldBlock,
    /// Any other socket error.
    Io(io::ErrorKind),
}

impl core::fmt::Display for TcpUartError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "peer disconnected"),
            Self::WouldBlock => write!(f, "socket send buffer full"),
            Self::Io(kind) => write!(f, "socket error: {}", kind),
        }
    }
}

/// [`Transport`] over one accepted TCP connection.
pub struct TcpUartTransport {
    stream: TcpStream,
    peer: Option<SocketAddr>,
    connected: bool,
}

impl TcpUartTransport {
    /// Take ownership of an accepted stream and switch it to non-blocking.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr().ok();
        info!("tcp-uart: client {:?} attached", peer);
        Ok(Self {
            stream,
            peer,
            connected: true,
        })
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    fn mark_disconnected(&mut self) {
        if self.connected {
            info!("tcp-uart: client {:?} detached", self.peer);
        }
        self.connected = false;
    }
}

impl Transport for TcpUartTransport {
    type Error = TcpUartError;

    /// Lower bound: peeks at most `PEEK_WINDOW` bytes, and reports 0 both
    /// when nothing is pending and when the peer has closed.  Only
    /// [`read`](Transport::read) detects a disconnect.
    fn available(&self) -> usize {
        let mut window = [0u8; PEEK_WINDOW];
        self.stream.peek(&mut window).unwrap_or(0)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TcpUartError> {
        if !self.connected {
            return Err(TcpUartError::Disconnected);
        }
        match self.stream.read(buf) {
            Ok(0) if !buf.is_empty() => {
                self.mark_disconnected();
                Err(TcpUartError::Disconnected)
            }
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(0),
            Err(e) => {
                warn!("tcp-uart: read error: {}", e);
                self.mark_disconnected();
                Err(TcpUartError::Io(e.kind()))
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TcpUartError> {
        if !self.connected {
            return Err(TcpUartError::Disconnected);
        }
        let mut sent = 0;
        let mut retries = 0;
        while sent < data.len() {
            match self.stream.write(&data[sent..]) {
                Ok(0) => {
                    self.mark_disconnected();
                    return Err(TcpUartError::Disconnected);
                }
                Ok(n) => sent += n,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                    ) =>
                {
                    retries += 1;
                    if retries > WRITE_RETRIES {
                        debug!("tcp-uart: send buffer full after {} of {} bytes", sent, data.len());
                        return Err(TcpUartError::WouldBlock);
                    }
                    std::thread::yield_now();
                }
                Err(e) => {
                    warn!("tcp-uart: write error: {}", e);
                    self.mark_disconnected();
                    return Err(TcpUartError::Io(e.kind()));
                }
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TcpUartError> {
        match self.stream.flush() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(TcpUartError::Io(e.kind())),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Duration;

    fn pair() -> (TcpUartTransport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (TcpUartTransport::new(server).unwrap(), client)
    }

    fn read_until(t: &mut TcpUartTransport, want: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        for _ in 0..200 {
            let n = t.read(&mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
            if out.len() >= want {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        out
    }

    #[test]
    fn empty_read_does_not_block() {
        let (mut t, _client) = pair();
        let mut buf = [0u8; 16];
        assert_eq!(t.read(&mut buf), Ok(0));
        assert!(t.is_connected());
    }

    #[test]
    fn bytes_flow_both_ways() {
        let (mut t, mut client) = pair();
        client.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(read_until(&mut t, 3), vec![1, 2, 3]);

        t.write(&[9, 8]).unwrap();
        t.flush().unwrap();
        let mut back = [0u8; 2];
        client.read_exact(&mut back).unwrap();
        assert_eq!(back, [9, 8]);
    }

    #[test]
    fn available_is_capped_by_peek_window() {
        let (mut t, mut client) = pair();
        assert_eq!(t.available(), 0);

        client.write_all(&[0x42; 100]).unwrap();
        let mut seen = 0;
        for _ in 0..200 {
            seen = t.available();
            if seen == PEEK_WINDOW {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(seen, PEEK_WINDOW);

        // Peeking consumes nothing.
        assert_eq!(read_until(&mut t, 100).len(), 100);
    }

    #[test]
    fn peer_close_marks_disconnected() {
        let (mut t, client) = pair();
        drop(client);
        let mut buf = [0u8; 8];
        let mut result = Ok(0);
        for _ in 0..200 {
            result = t.read(&mut buf);
            if result.is_err() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(result, Err(TcpUartError::Disconnected));
        assert!(!t.is_connected());
    }
}
