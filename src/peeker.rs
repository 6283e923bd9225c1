use std::io::{BufRead, Error, ErrorKind, IoSlice, Read, Result, Write};

use crate::util::copy_prefix;
use crate::{Duplex, Peek};

/// A wrapper for a duplex stream that implements [`Peek`] using a replay buffer.
///
/// Peeked bytes are pulled from the underlying stream into the replay buffer
/// and handed out again by [`Read::read`] before any fresh data. Once the
/// buffer is drained the peeker is a plain pass-through.
///
/// A single `read` call never mixes replayed and fresh bytes: while the
/// buffer is non-empty, reads are served from it alone, possibly short.
///
/// The wrapped stream may be borrowed (`StreamPeeker<&TcpStream>`) so the
/// caller keeps ownership of the connection. Reading from that stream directly
/// while bytes are buffered skips over them.
#[derive(Debug)]
pub struct StreamPeeker<S> {
    // Where we store the peeked but not yet read data.
    // This data lives in the buffer buf_storage[buf_begin..].
    // We can thus have free space at the front.
    buf_storage: Vec<u8>,
    buf_begin: usize,

    min_read_size: usize,
    fill_size: usize,

    inner: S,
}

impl<S> StreamPeeker<S> {
    const MIN_RECLAIM_SIZE: usize = 1024 * 20;
    const DEFAULT_FILL_SIZE: usize = 8 * 1024;

    /// Creates a new [`StreamPeeker`] with an empty replay buffer.
    pub fn new(stream: S) -> Self {
        Self::with_capacity(0, stream)
    }

    /// Creates a new [`StreamPeeker`] whose replay buffer can hold at least
    /// `capacity` bytes without reallocating.
    pub fn with_capacity(capacity: usize, stream: S) -> Self {
        Self {
            buf_storage: Vec::with_capacity(capacity),
            buf_begin: 0,
            min_read_size: 0,
            fill_size: Self::DEFAULT_FILL_SIZE,
            inner: stream,
        }
    }

    /// Sets the minimum size used when a peek reads from the underlying stream.
    ///
    /// By default a peek only asks for the bytes it is missing. A bigger value
    /// saves reads on chatty protocols, but may block waiting for data the
    /// caller never asked for. Extra bytes stay buffered for `read`.
    pub fn set_min_read_size(&mut self, nbytes: usize) {
        self.min_read_size = nbytes;
    }

    /// Gets the minimum read size. See [`Self::set_min_read_size`].
    pub fn min_read_size(&self) -> usize {
        self.min_read_size
    }

    /// Sets how many bytes [`BufRead::fill_buf`] asks for when the replay
    /// buffer is empty. Values below 1 are raised to 1.
    pub fn set_fill_size(&mut self, nbytes: usize) {
        self.fill_size = nbytes.max(1);
    }

    /// Gets the fill size. See [`Self::set_fill_size`].
    pub fn fill_size(&self) -> usize {
        self.fill_size
    }

    /// Returns a reference to the buffered data that has been peeked but not read.
    ///
    /// Unlike [`BufRead::fill_buf`], this will not attempt to fill the buffer if it is empty.
    pub fn buffer(&self) -> &[u8] {
        &self.buf_storage[self.buf_begin..]
    }

    /// Number of bytes waiting in the replay buffer.
    pub fn buffered_len(&self) -> usize {
        self.buf_storage.len() - self.buf_begin
    }

    /// Whether reads currently go straight to the underlying stream.
    pub fn is_passthrough(&self) -> bool {
        self.buffered_len() == 0
    }

    /// Gets a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Gets a mutable reference to the underlying stream.
    ///
    /// It is inadvisable to directly read from the underlying stream unless
    /// [`Self::is_passthrough`] holds, buffered bytes would be skipped.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwraps this `StreamPeeker<S>`, returning the underlying stream.
    ///
    /// Any buffered data is lost, see [`Self::into_parts`].
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Unwraps this `StreamPeeker<S>`, returning the underlying stream
    /// together with the bytes that were peeked but not yet read.
    pub fn into_parts(mut self) -> (S, Vec<u8>) {
        self.buf_storage.drain(..self.buf_begin);
        (self.inner, self.buf_storage)
    }

    fn consume_buffered(&mut self, amt: usize) {
        if self.is_passthrough() {
            return;
        }
        self.buf_begin = (self.buf_begin + amt).min(self.buf_storage.len());
        if self.buf_begin == self.buf_storage.len() {
            log::trace!("replay buffer drained, reading directly from stream");
            self.buf_storage.clear();
            self.buf_begin = 0;
        }
    }

    fn reclaim_space_from_front(&mut self) {
        // If our capacity is at least half unused (and sufficiently big),
        // move the elements back to the start.
        let cap = self.buf_storage.capacity();
        if cap >= Self::MIN_RECLAIM_SIZE && self.buf_begin >= cap / 2 {
            self.buf_storage.drain(..self.buf_begin);
            self.buf_begin = 0;
        }
    }
}

impl<S: Read> StreamPeeker<S> {
    /// Like [`Peek::peek`], but fills all of `buf`, reading from the
    /// underlying stream as often as needed.
    ///
    /// Fails with [`ErrorKind::UnexpectedEof`] if the stream ends first. All
    /// bytes obtained up to that point remain buffered for `read`.
    pub fn peek_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        while self.buffered_len() < buf.len() {
            match self.pull(buf.len() - self.buffered_len()) {
                Ok(0) => {
                    return Err(Error::new(
                        ErrorKind::UnexpectedEof,
                        "failed to fill whole peek buffer",
                    ))
                }
                Ok(_) => {}
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {} // Ignore interrupt.
                Err(e) => return Err(e),
            }
        }
        copy_prefix(self.buffer(), buf);
        Ok(())
    }

    // Appends the result of a single underlying read of at least nbytes
    // (or min_read_size) to the buffer. Nothing is kept on error.
    fn pull(&mut self, nbytes: usize) -> Result<usize> {
        if self.is_passthrough() {
            log::trace!("started buffering for peek");
        }
        self.reclaim_space_from_front();
        let read_size = nbytes.max(self.min_read_size);
        let old_len = self.buf_storage.len();
        self.buf_storage.resize(old_len + read_size, 0);
        match self.inner.read(&mut self.buf_storage[old_len..]) {
            Ok(n) => {
                let n = n.min(read_size);
                self.buf_storage.truncate(old_len + n);
                log::trace!(
                    "pulled {} of {} requested bytes, {} buffered",
                    n,
                    read_size,
                    self.buffered_len()
                );
                Ok(n)
            }
            Err(e) => {
                self.buf_storage.truncate(old_len);
                log::debug!("underlying read failed while buffering: {}", e);
                Err(e)
            }
        }
    }
}

impl<S: Read> Peek for StreamPeeker<S> {
    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        let buffered = self.buffered_len();
        if buffered < buf.len() {
            self.pull(buf.len() - buffered)?;
        }
        let written = copy_prefix(self.buffer(), buf);
        if written < buf.len() {
            log::debug!("short peek: {} of {} bytes available", written, buf.len());
        }
        Ok(written)
    }
}

impl<S: Read> Read for StreamPeeker<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.is_passthrough() {
            return self.inner.read(buf);
        }
        let written = copy_prefix(self.buffer(), buf);
        self.consume_buffered(written);
        Ok(written)
    }
}

impl<S: Read> BufRead for StreamPeeker<S> {
    fn fill_buf(&mut self) -> Result<&[u8]> {
        if self.is_passthrough() {
            self.pull(self.fill_size)?;
        }
        Ok(self.buffer())
    }

    fn consume(&mut self, amt: usize) {
        self.consume_buffered(amt);
    }
}

impl<S: Write> Write for StreamPeeker<S> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.inner.write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> Result<usize> {
        self.inner.write_vectored(bufs)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

impl<S: Duplex> Duplex for StreamPeeker<S> {
    type Addr = S::Addr;

    fn peer_addr(&self) -> Result<Self::Addr> {
        self.inner.peer_addr()
    }

    fn local_addr(&self) -> Result<Self::Addr> {
        self.inner.local_addr()
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }
}
