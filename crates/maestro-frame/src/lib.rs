//! Command framing for the Pololu Maestro serial protocol.
//!
//! Pure and stateless: every operation maps to one fixed-layout frame.
//! - An optional 2-byte header (`0xAA`, device number) for shared buses
//! - A 1-byte command selecting the operation
//! - Up to 3 payload bytes; 14-bit values are split into two 7-bit bytes
//!
//! Replies are fixed-size (2 bytes for a position, 1 byte for the moving
//! state) and are decoded here too. No I/O happens in this crate.

pub mod channel;
pub mod codec;
pub mod command;
pub mod error;

pub use channel::{CHANNEL_COUNT, MAX_CHANNEL};
pub use codec::{
    decode_moving_state, decode_position, encode_command, join_14, split_14, Addressing,
    CommandFrame, DEFAULT_DEVICE_ADDRESS, MAX_14BIT, MAX_FRAME_SIZE, POLOLU_START,
};
pub use command::{Command, Opcode};
pub use error::{FrameError, Result};
