//! Host-side control of Pololu Maestro servo controllers.
//!
//! maestro drives the Maestro serial protocol over a USB CDC command port or
//! a UART: set targets, speeds and accelerations on up to 24 channels, read
//! positions and motion state back, and start or stop script subroutines.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte transport contract, serial ports, in-memory port
//! - [`frame`]: Command frame encoding and reply decoding
//! - [`controller`]: Per-channel soft limits, target tracking and the public operation set

/// Re-export transport types.
pub mod transport {
    pub use maestro_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use maestro_frame::*;
}

/// Re-export controller types.
pub mod controller {
    pub use maestro_controller::*;
}

pub use maestro_controller::{connect, ChannelController, ControllerConfig, ControllerError};
