//! In-memory serial port double.
//!
//! `MemoryPort` behaves like a serial device with a read deadline: reads are
//! served from a queue of scripted response bytes and fail with `TimedOut`
//! once the queue is empty. Everything written is recorded and can be
//! inspected through a [`MemoryPortHandle`] after the port has been moved
//! into a transport.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::traits::StreamTransport;

#[derive(Debug, Default)]
struct PortState {
    written: Vec<u8>,
    responses: VecDeque<u8>,
    fail_next_write: Option<ErrorKind>,
    fail_next_read: Option<ErrorKind>,
}

/// A scripted in-memory byte stream.
#[derive(Debug, Clone, Default)]
pub struct MemoryPort {
    state: Arc<Mutex<PortState>>,
}

/// Shared view of a [`MemoryPort`] for scripting responses and inspecting writes.
#[derive(Debug, Clone)]
pub struct MemoryPortHandle {
    state: Arc<Mutex<PortState>>,
}

impl MemoryPort {
    /// Create a new port and its handle.
    pub fn new() -> (Self, MemoryPortHandle) {
        let port = Self::default();
        let handle = port.handle();
        (port, handle)
    }

    /// Create a transport over a fresh port, returning its handle.
    pub fn transport() -> (StreamTransport<Self>, MemoryPortHandle) {
        let (port, handle) = Self::new();
        (StreamTransport::new(port), handle)
    }

    /// Another handle onto this port's state.
    pub fn handle(&self) -> MemoryPortHandle {
        MemoryPortHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn state(&self) -> MutexGuard<'_, PortState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryPortHandle {
    /// Queue bytes to be returned by subsequent reads.
    pub fn push_response(&self, bytes: &[u8]) {
        self.state().responses.extend(bytes.iter().copied());
    }

    /// Everything written to the port so far.
    pub fn written(&self) -> Vec<u8> {
        self.state().written.clone()
    }

    /// Drain and return everything written to the port so far.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.state().written)
    }

    /// Number of queued response bytes not yet read.
    pub fn pending_response_len(&self) -> usize {
        self.state().responses.len()
    }

    /// Make the next write fail with `kind`.
    pub fn fail_next_write(&self, kind: ErrorKind) {
        self.state().fail_next_write = Some(kind);
    }

    /// Make the next read fail with `kind`.
    pub fn fail_next_read(&self, kind: ErrorKind) {
        self.state().fail_next_read = Some(kind);
    }

    fn state(&self) -> MutexGuard<'_, PortState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Read for MemoryPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut state = self.state();
        if let Some(kind) = state.fail_next_read.take() {
            return Err(std::io::Error::from(kind));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        if state.responses.is_empty() {
            return Err(std::io::Error::from(ErrorKind::TimedOut));
        }

        let n = buf.len().min(state.responses.len());
        for (slot, byte) in buf.iter_mut().zip(state.responses.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MemoryPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = self.state();
        if let Some(kind) = state.fail_next_write.take() {
            return Err(std::io::Error::from(kind));
        }
        state.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
