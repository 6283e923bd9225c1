#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Result, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use peekconn::Duplex;

/// 51 bytes, the echo server answers once it sees the trailing newline.
pub const MESSAGE: &[u8] = b"AABBCCDDEEFFGGHHIIJJKKLLMMOOPPQQRRSSTTUUVVWWXXYYZZ\n";

pub const END_TRANSMISSION: &[u8] = b"please close the connection\n";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Spawns a line based echo server on an ephemeral loopback port.
///
/// Every line is echoed back verbatim until a client sends [`END_TRANSMISSION`].
pub fn spawn_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("failed to bind echo server");
    let addr = listener.local_addr().expect("echo server has no address");
    thread::spawn(move || {
        for conn in listener.incoming() {
            let conn = match conn {
                Ok(conn) => conn,
                Err(e) => {
                    log::warn!("echo server failed to accept: {}", e);
                    continue;
                }
            };
            thread::spawn(move || {
                if let Err(e) = echo_lines(conn) {
                    log::debug!("echo session ended: {}", e);
                }
            });
        }
    });
    addr
}

fn echo_lines(conn: TcpStream) -> Result<()> {
    let mut writer = conn.try_clone()?;
    let mut reader = BufReader::new(conn);
    loop {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line)? == 0 || line == END_TRANSMISSION {
            return Ok(());
        }
        writer.write_all(&line)?;
    }
}

/// In-memory duplex stream that never hands out more than the next chunk
/// size per read call, so peeks observe short reads.
#[derive(Debug)]
pub struct ChunkedStream {
    data: Vec<u8>,
    pos: usize,
    chunks: Vec<usize>,
    pub reads: usize,
    pub written: Vec<u8>,
}

impl ChunkedStream {
    pub fn new(data: Vec<u8>, chunks: Vec<usize>) -> Self {
        assert!(chunks.iter().all(|&c| c > 0), "chunk sizes must be positive");
        Self {
            data,
            pos: 0,
            chunks,
            reads: 0,
            written: Vec::new(),
        }
    }

    /// Stream that answers any read with as much data as fits.
    pub fn whole(data: &[u8]) -> Self {
        Self::new(data.to_vec(), vec![usize::MAX])
    }
}

impl Read for ChunkedStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let chunk = if self.chunks.is_empty() {
            usize::MAX
        } else {
            self.chunks[self.reads % self.chunks.len()]
        };
        self.reads += 1;
        let rest = &self.data[self.pos..];
        let n = rest.len().min(buf.len()).min(chunk);
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for ChunkedStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Duplex for ChunkedStream {
    type Addr = &'static str;

    fn peer_addr(&self) -> Result<&'static str> {
        Ok("remote")
    }

    fn local_addr(&self) -> Result<&'static str> {
        Ok("local")
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
