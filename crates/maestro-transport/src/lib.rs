//! Byte transport abstraction for Pololu Maestro servo controllers.
//!
//! The protocol layer only needs three things from its environment: write a
//! command atomically, read an exact number of response bytes, and release
//! the link. This crate provides that contract as the [`Transport`] trait,
//! a generic adapter over any `Read + Write` stream, a host serial-port
//! opener (USB CDC or UART adapters), and an in-memory port for tests.
//!
//! This is the lowest layer of maestro. Everything else builds on top of it.

pub mod error;
pub mod memory;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::{MemoryPort, MemoryPortHandle};
pub use serial::{open_serial, SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};
pub use traits::{StreamTransport, Transport};
