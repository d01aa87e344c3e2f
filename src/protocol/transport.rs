//! Transport abstraction: any byte-oriented channel.
//!
//! Concrete implementations:
//! - UART exposed over TCP ([`TcpUartTransport`](crate::adapters::tcp_uart::TcpUartTransport))
//! - a real serial peripheral on target hardware (outside this crate)
//!
//! The frame stream and the link are generic over `Transport`, so adding a
//! new transport requires zero changes to the protocol logic.

/// Byte-oriented transport channel.
///
/// Reads must never block: a call with nothing pending returns `Ok(0)`.
/// Writes must be bounded in time.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Lower bound on the bytes readable right now without blocking.
    /// Implementations that cannot tell may return 0 and still deliver
    /// bytes from [`read`](Self::read); the frame stream therefore reads
    /// until `read` returns 0 instead of trusting this count.
    fn available(&self) -> usize;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read, 0 if nothing is pending.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data` to the transport.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Whether the peer is still reachable.
    fn is_connected(&self) -> bool {
        true
    }
}

/// A null transport that discards all writes and never reads.
/// Useful as a default when no host is attached.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn available(&self) -> usize {
        0
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, _data: &[u8]) -> Result<(), ()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
