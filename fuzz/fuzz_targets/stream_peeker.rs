#![no_main]

use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use peekconn::{Peek, StreamPeeker};
use std::io::{BufRead, Cursor, ErrorKind, Read, Result};

#[derive(Arbitrary, Debug)]
pub struct Target {
    pub refdat: Vec<u8>,
    pub chunks: Vec<u8>,
    pub min_read_size: u8,
    pub ops: Vec<Op>,
}

#[derive(Arbitrary, Debug)]
pub enum Op {
    Read(u16),
    Peek(u16),
    PeekExact(u16),
    FillBuf,
    Consume(u16),
    ReadToEnd,
}

// Short reads on a schedule, so peeks see partial data.
struct Chunked {
    inner: Cursor<Vec<u8>>,
    chunks: Vec<u8>,
    calls: usize,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let limit = match self.chunks.get(self.calls % self.chunks.len().max(1)) {
            Some(&c) => (c as usize).max(1),
            None => usize::MAX,
        };
        self.calls += 1;
        let n = buf.len().min(limit);
        self.inner.read(&mut buf[..n])
    }
}

fuzz_target!(|data: Target| {
    let mut reference = Cursor::new(data.refdat.clone());
    let mut peeker = StreamPeeker::new(Chunked {
        inner: Cursor::new(data.refdat),
        chunks: data.chunks,
        calls: 0,
    });
    peeker.set_min_read_size(data.min_read_size as usize);

    for op in &data.ops {
        match *op {
            Op::Read(n) => {
                let mut vp = vec![0; n as usize];
                let got = peeker.read(&mut vp).unwrap();
                let mut vr = vec![0; got];
                reference.read_exact(&mut vr).unwrap();
                assert_eq!(vr, &vp[..got]);
            }
            Op::Peek(n) => {
                let mut vp = vec![0; n as usize];
                let got = peeker.peek(&mut vp).unwrap();
                let mut vr = vec![0; n as usize];
                let expected = reference.peek(&mut vr).unwrap();
                assert!(got <= expected);
                assert_eq!(vr[..got], vp[..got]);
            }
            Op::PeekExact(n) => {
                let mut vp = vec![0; n as usize];
                let mut vr = vec![0; n as usize];
                let expected = reference.peek(&mut vr).unwrap();
                match peeker.peek_exact(&mut vp) {
                    Ok(()) => {
                        assert_eq!(expected, vr.len());
                        assert_eq!(vr, vp);
                    }
                    Err(e) => {
                        assert_eq!(e.kind(), ErrorKind::UnexpectedEof);
                        assert!(expected < vr.len());
                        assert_eq!(peeker.buffered_len(), expected);
                    }
                }
            }
            Op::FillBuf => {
                let buffered = peeker.fill_buf().unwrap().to_vec();
                let rest = &reference.get_ref()[reference.position() as usize..];
                assert!(rest.starts_with(&buffered));
            }
            Op::Consume(n) => {
                let amt = (n as usize).min(peeker.buffered_len());
                peeker.consume(amt);
                reference.consume(amt);
            }
            Op::ReadToEnd => {
                let mut vr = Vec::new();
                let mut vp = Vec::new();
                reference.read_to_end(&mut vr).unwrap();
                peeker.read_to_end(&mut vp).unwrap();
                assert_eq!(vr, vp);
            }
        }
    }
});
