use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::command::{Command, Opcode};
use crate::error::{FrameError, Result};

/// First byte of every Pololu-protocol frame.
pub const POLOLU_START: u8 = 0xAA;

/// Factory-default device number.
pub const DEFAULT_DEVICE_ADDRESS: u8 = 0x0C;

/// Largest value representable by the 7/7 split.
pub const MAX_14BIT: u16 = 0x3FFF;

/// Bit that marks a command byte in the compact protocol.
pub const COMPACT_COMMAND_BIT: u8 = 0x80;

/// Largest possible frame: header (2) + command (1) + payload (3).
pub const MAX_FRAME_SIZE: usize = 6;

/// How frames identify the target controller.
///
/// Chosen once per connection. A shared bus (daisy-chained UART) needs the
/// Pololu header so that only the addressed board acts; a dedicated link
/// can use the shorter compact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Addressing {
    /// `0xAA <device>` header followed by the opcode.
    Pololu { device: u8 },
    /// No header; the opcode is sent with bit 7 set, so set target goes out
    /// as `0x84` rather than the `0x04` used after a Pololu header.
    Compact,
}

impl Default for Addressing {
    fn default() -> Self {
        Addressing::Pololu {
            device: DEFAULT_DEVICE_ADDRESS,
        }
    }
}

impl Addressing {
    /// Number of bytes preceding the command byte.
    pub fn header_len(&self) -> usize {
        match self {
            Addressing::Pololu { .. } => 2,
            Addressing::Compact => 0,
        }
    }

    /// The byte that selects `opcode` under this addressing mode.
    pub fn command_byte(&self, opcode: Opcode) -> u8 {
        match self {
            Addressing::Pololu { .. } => opcode.as_byte(),
            Addressing::Compact => opcode.as_byte() | COMPACT_COMMAND_BIT,
        }
    }

    /// Device number, when frames carry one.
    pub fn device(&self) -> Option<u8> {
        match *self {
            Addressing::Pololu { device } => Some(device),
            Addressing::Compact => None,
        }
    }
}

/// Split a 14-bit value into two 7-bit wire bytes `(lsb, msb)`.
///
/// Bits above bit 13 are discarded; the protocol reserves bit 7 of every
/// data byte.
pub fn split_14(value: u16) -> (u8, u8) {
    let lsb = (value & 0x7F) as u8;
    let msb = ((value >> 7) & 0x7F) as u8;
    (lsb, msb)
}

/// Inverse of [`split_14`].
pub fn join_14(lsb: u8, msb: u8) -> u16 {
    (u16::from(msb & 0x7F) << 7) | u16::from(lsb & 0x7F)
}

/// An encoded, ready-to-send command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: Bytes,
}

impl CommandFrame {
    /// The wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total wire size.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the frame and return its bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Encode `command` into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────────┬──────────┬──────────────────────────┐
/// │ Header (0 or 2B)     │ Command  │ Payload (0-3B)           │
/// │ 0xAA <device>        │ (1B)     │ channel/sub, lsb, msb    │
/// └──────────────────────┴──────────┴──────────────────────────┘
/// ```
pub fn encode_command(command: &Command, addressing: Addressing, dst: &mut BytesMut) {
    dst.reserve(addressing.header_len() + 1 + command.payload_len());

    if let Addressing::Pololu { device } = addressing {
        dst.put_u8(POLOLU_START);
        dst.put_u8(device);
    }
    dst.put_u8(addressing.command_byte(command.opcode()));

    match *command {
        Command::SetTarget {
            channel,
            target: value,
        }
        | Command::SetSpeed {
            channel,
            speed: value,
        }
        | Command::SetAcceleration {
            channel,
            acceleration: value,
        } => put_14(dst, channel, value),
        Command::RunScriptSubroutineWithParameter {
            subroutine,
            parameter,
        } => put_14(dst, subroutine, parameter),
        Command::GetPosition { channel } => dst.put_u8(channel),
        Command::RunScriptSubroutine { subroutine } => dst.put_u8(subroutine),
        Command::GetMovingState | Command::StopScript => {}
    }
}

fn put_14(dst: &mut BytesMut, lead: u8, value: u16) {
    let (lsb, msb) = split_14(value);
    dst.put_u8(lead);
    dst.put_u8(lsb);
    dst.put_u8(msb);
}

impl Command {
    /// Encode into a standalone frame.
    pub fn encode(&self, addressing: Addressing) -> CommandFrame {
        let mut buf = BytesMut::with_capacity(MAX_FRAME_SIZE);
        encode_command(self, addressing, &mut buf);
        trace!(opcode = %self.opcode(), bytes = ?&buf[..], "encoded command");
        CommandFrame {
            bytes: buf.freeze(),
        }
    }
}

/// Decode a Get Position reply.
///
/// Unlike command payloads, the reply uses full 8-bit bytes: `(msb << 8) | lsb`.
pub fn decode_position(src: &[u8]) -> Result<u16> {
    match src {
        [lsb, msb] => Ok(u16::from_le_bytes([*lsb, *msb])),
        _ => Err(FrameError::ResponseLength {
            expected: 2,
            actual: src.len(),
        }),
    }
}

/// Decode a Get Moving State reply. Any nonzero byte means at least one
/// channel has not reached its target.
pub fn decode_moving_state(src: &[u8]) -> Result<bool> {
    match src {
        [state] => Ok(*state != 0x00),
        _ => Err(FrameError::ResponseLength {
            expected: 1,
            actual: src.len(),
        }),
    }
}
