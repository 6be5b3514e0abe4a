use std::io::{ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::error::{Result, TransportError};

/// The byte-level contract the protocol layer requires from its environment.
///
/// Implementations must never return a short read silently: either exactly
/// `len` bytes come back, or an error does.
pub trait Transport {
    /// Send a complete command. Either every byte is accepted or an error is
    /// returned. A stream that would block is reported as an I/O error, not
    /// retried.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Block until exactly `len` bytes are available.
    fn read_exact(&mut self, len: usize) -> Result<Bytes>;

    /// Release the underlying resource. Safe to call more than once.
    fn close(&mut self) -> Result<()>;

    /// Whether [`Transport::close`] has already released the resource.
    fn is_closed(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        (**self).read_exact(len)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// Adapts any `Read + Write` byte stream into a [`Transport`].
///
/// Read deadlines are whatever the inner stream enforces: a `TimedOut` or
/// `WouldBlock` error (or EOF) before the requested count arrives surfaces
/// as [`TransportError::ShortRead`].
pub struct StreamTransport<T> {
    inner: Option<T>,
}

impl<T: Read + Write> StreamTransport<T> {
    /// Wrap an open stream.
    pub fn new(inner: T) -> Self {
        Self { inner: Some(inner) }
    }

    /// Borrow the underlying stream, if still open.
    pub fn get_ref(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    /// Mutably borrow the underlying stream, if still open.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.inner.as_mut()
    }

    /// Consume the transport and return the inner stream, if still open.
    pub fn into_inner(self) -> Option<T> {
        self.inner
    }

    fn stream(&mut self) -> Result<&mut T> {
        self.inner.as_mut().ok_or(TransportError::Closed)
    }
}

impl<T: Read + Write> Transport for StreamTransport<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream()?;

        let mut offset = 0usize;
        while offset < bytes.len() {
            match stream.write(&bytes[offset..]) {
                Ok(0) => return Err(std::io::Error::from(ErrorKind::WriteZero).into()),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match stream.flush() {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        trace!(len = bytes.len(), ?bytes, "wrote command");
        Ok(())
    }

    fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        let stream = self.stream()?;

        let mut buf = BytesMut::zeroed(len);
        let mut filled = 0usize;
        while filled < len {
            match stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(TransportError::ShortRead {
                        expected: len,
                        received: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) =>
                {
                    return Err(TransportError::ShortRead {
                        expected: len,
                        received: filled,
                    })
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        trace!(len, bytes = ?&buf[..], "read response");
        Ok(buf.freeze())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.inner.take() {
            drop(stream);
            debug!("transport closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl<T> std::fmt::Debug for StreamTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTransport")
            .field("open", &self.inner.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    struct Duplex<R> {
        input: R,
        output: Vec<u8>,
    }

    impl<R: Read> Read for Duplex<R> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl<R> Write for Duplex<R> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn duplex(input: &[u8]) -> Duplex<Cursor<Vec<u8>>> {
        Duplex {
            input: Cursor::new(input.to_vec()),
            output: Vec::new(),
        }
    }

    #[test]
    fn write_passes_bytes_through() {
        let mut transport = StreamTransport::new(duplex(&[]));
        transport.write(&[0xAA, 0x0C, 0x24]).unwrap();
        assert_eq!(transport.get_ref().unwrap().output, vec![0xAA, 0x0C, 0x24]);
    }

    #[test]
    fn read_exact_returns_requested_count() {
        let mut transport = StreamTransport::new(duplex(&[0x70, 0x17, 0x01]));
        let bytes = transport.read_exact(2).unwrap();
        assert_eq!(bytes.as_ref(), &[0x70, 0x17]);
        let bytes = transport.read_exact(1).unwrap();
        assert_eq!(bytes.as_ref(), &[0x01]);
    }

    #[test]
    fn read_exact_zero_len_is_empty() {
        let mut transport = StreamTransport::new(duplex(&[]));
        assert!(transport.read_exact(0).unwrap().is_empty());
    }

    #[test]
    fn eof_before_complete_response_is_short_read() {
        let mut transport = StreamTransport::new(duplex(&[0x70]));
        let err = transport.read_exact(2).unwrap_err();
        assert!(matches!(
            err,
            TransportError::ShortRead {
                expected: 2,
                received: 1
            }
        ));
    }

    #[test]
    fn timeout_is_short_read() {
        let mut transport = StreamTransport::new(Duplex {
            input: TimeoutAfter {
                bytes: vec![0x01],
                pos: 0,
            },
            output: Vec::new(),
        });
        let err = transport.read_exact(2).unwrap_err();
        assert!(matches!(
            err,
            TransportError::ShortRead {
                expected: 2,
                received: 1
            }
        ));
    }

    #[test]
    fn partial_read_handling() {
        let mut transport = StreamTransport::new(Duplex {
            input: ByteByByteReader {
                bytes: vec![0x40, 0x2E],
                pos: 0,
                interrupted: false,
            },
            output: Vec::new(),
        });
        let bytes = transport.read_exact(2).unwrap();
        assert_eq!(bytes.as_ref(), &[0x40, 0x2E]);
    }

    #[test]
    fn other_read_errors_are_io() {
        let mut transport = StreamTransport::new(Duplex {
            input: BrokenReader,
            output: Vec::new(),
        });
        let err = transport.read_exact(1).unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let mut transport = StreamTransport::new(InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        });
        transport.write(&[0x13]).unwrap();
        assert_eq!(transport.get_ref().unwrap().data, vec![0x13]);
    }

    #[test]
    fn zero_length_write_is_an_error() {
        let mut transport = StreamTransport::new(ZeroWriter);
        let err = transport.write(&[0x24]).unwrap_err();
        match err {
            TransportError::Io(io) => assert_eq!(io.kind(), ErrorKind::WriteZero),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn would_block_write_is_an_error() {
        let mut transport = StreamTransport::new(BlockingWriter { block_flush: false });
        let err = transport.write(&[0x24]).unwrap_err();
        match err {
            TransportError::Io(io) => assert_eq!(io.kind(), ErrorKind::WouldBlock),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn would_block_flush_is_an_error() {
        let mut transport = StreamTransport::new(BlockingWriter { block_flush: true });
        let err = transport.write(&[0x24]).unwrap_err();
        assert!(matches!(err, TransportError::Io(io) if io.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn close_is_idempotent_and_blocks_further_io() {
        let mut transport = StreamTransport::new(duplex(&[0x00]));
        assert!(!transport.is_closed());

        transport.close().unwrap();
        transport.close().unwrap();
        assert!(transport.is_closed());

        assert!(matches!(
            transport.write(&[0x24]),
            Err(TransportError::Closed)
        ));
        assert!(matches!(
            transport.read_exact(1),
            Err(TransportError::Closed)
        ));
        assert!(transport.into_inner().is_none());
    }

    #[test]
    fn boxed_transport_delegates() {
        let mut transport: Box<dyn Transport> = Box::new(StreamTransport::new(duplex(&[0x05])));
        transport.write(&[0x13]).unwrap();
        assert_eq!(transport.read_exact(1).unwrap().as_ref(), &[0x05]);
        transport.close().unwrap();
        assert!(transport.is_closed());
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
        interrupted: bool,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct TimeoutAfter {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for TimeoutAfter {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Read for InterruptedWriteThenFlush {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Read for ZeroWriter {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BlockingWriter {
        block_flush: bool,
    }

    impl Read for BlockingWriter {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for BlockingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.block_flush {
                Ok(buf.len())
            } else {
                Err(std::io::Error::from(ErrorKind::WouldBlock))
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }
    }
}
