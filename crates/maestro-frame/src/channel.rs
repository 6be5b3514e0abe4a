//! Channel numbering.
//!
//! The largest Maestro (Mini Maestro 24) exposes 24 outputs, numbered 0-23.
//! Smaller boards use a prefix of the same range.

/// Number of addressable channels.
pub const CHANNEL_COUNT: usize = 24;

/// Highest valid channel number.
pub const MAX_CHANNEL: u8 = (CHANNEL_COUNT - 1) as u8;

/// Returns true if `channel` addresses one of the controller's outputs.
pub fn is_valid(channel: u8) -> bool {
    usize::from(channel) < CHANNEL_COUNT
}
