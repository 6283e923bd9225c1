//! Lookahead for duplex streams.
//!
//! [`StreamPeeker`] wraps a connection (anything implementing [`Duplex`]) and
//! lets you look at the bytes that are about to arrive before committing to a
//! regular read. Everything you peek at is replayed, in order, to the next
//! calls of [`Read::read`], so protocol sniffing never loses data:
//!
//! ```no_run
//! use std::io::Read;
//! use std::net::TcpStream;
//! use peekconn::{Peek, StreamPeeker};
//!
//! # fn main() -> std::io::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:8080")?;
//! let mut conn = StreamPeeker::new(&stream);
//!
//! let mut magic = [0u8; 4];
//! let n = conn.peek(&mut magic)?;
//! let is_http = &magic[..n] == b"GET ";
//!
//! // The four peeked bytes come back first.
//! let mut request = Vec::new();
//! conn.read_to_end(&mut request)?;
//! # let _ = is_http;
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;
use std::io::{Read, Result, Write};

mod foreign_impl;
mod peeker;
mod util;
pub use peeker::StreamPeeker;

/// A [`Read`] stream that can look ahead without consuming.
///
/// Bytes returned by [`Peek::peek`] are the bytes the next [`Read::read`]
/// calls will return. Peeking again, with any size, returns a prefix of the
/// same data; it never skips ahead.
pub trait Peek: Read {
    /// Fills `buf` with up to `buf.len()` upcoming bytes without consuming them.
    ///
    /// A short count is not an error, it follows the short read semantics of
    /// the underlying stream. `Ok(0)` with a non-empty `buf` means end of stream.
    fn peek(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// A bidirectional byte stream, e.g. a network connection.
///
/// This is the capability [`StreamPeeker`] decorates and re-exposes, so a
/// peeker can be handed to any code expecting the plain connection.
pub trait Duplex: Read + Write {
    /// Address type reported by [`Duplex::peer_addr`] and [`Duplex::local_addr`].
    type Addr: Debug;

    /// Returns the address of the remote end.
    fn peer_addr(&self) -> Result<Self::Addr>;

    /// Returns the address of the local end.
    fn local_addr(&self) -> Result<Self::Addr>;

    /// Shuts down both directions of the stream.
    fn close(&self) -> Result<()>;
}
