use crate::util::copy_prefix;
use crate::{Duplex, Peek};
use std::io::{Cursor, Result};
use std::net::{Shutdown, SocketAddr, TcpStream};

impl<T: Peek + ?Sized> Peek for &mut T {
    #[inline]
    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).peek(buf)
    }
}

impl<T: Peek + ?Sized> Peek for Box<T> {
    #[inline]
    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).peek(buf)
    }
}

impl Peek for &[u8] {
    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(copy_prefix(self, buf))
    }
}

impl<T: AsRef<[u8]>> Peek for Cursor<T> {
    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        let data = self.get_ref().as_ref();
        // Positions past the end behave like EOF, as they do for reads.
        let start = (self.position() as usize).min(data.len());
        Ok(copy_prefix(&data[start..], buf))
    }
}

impl<T: Duplex + ?Sized> Duplex for &mut T {
    type Addr = T::Addr;

    #[inline]
    fn peer_addr(&self) -> Result<Self::Addr> {
        (**self).peer_addr()
    }

    #[inline]
    fn local_addr(&self) -> Result<Self::Addr> {
        (**self).local_addr()
    }

    #[inline]
    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

impl<T: Duplex + ?Sized> Duplex for Box<T> {
    type Addr = T::Addr;

    #[inline]
    fn peer_addr(&self) -> Result<Self::Addr> {
        (**self).peer_addr()
    }

    #[inline]
    fn local_addr(&self) -> Result<Self::Addr> {
        (**self).local_addr()
    }

    #[inline]
    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

impl Duplex for TcpStream {
    type Addr = SocketAddr;

    fn peer_addr(&self) -> Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn close(&self) -> Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

impl Duplex for &TcpStream {
    type Addr = SocketAddr;

    fn peer_addr(&self) -> Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn close(&self) -> Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

#[cfg(unix)]
mod unix {
    use crate::Duplex;
    use std::io::Result;
    use std::net::Shutdown;
    use std::os::unix::net::{SocketAddr, UnixStream};

    impl Duplex for UnixStream {
        type Addr = SocketAddr;

        fn peer_addr(&self) -> Result<SocketAddr> {
            UnixStream::peer_addr(self)
        }

        fn local_addr(&self) -> Result<SocketAddr> {
            UnixStream::local_addr(self)
        }

        fn close(&self) -> Result<()> {
            self.shutdown(Shutdown::Both)
        }
    }

    impl Duplex for &UnixStream {
        type Addr = SocketAddr;

        fn peer_addr(&self) -> Result<SocketAddr> {
            UnixStream::peer_addr(self)
        }

        fn local_addr(&self) -> Result<SocketAddr> {
            UnixStream::local_addr(self)
        }

        fn close(&self) -> Result<()> {
            self.shutdown(Shutdown::Both)
        }
    }
}
