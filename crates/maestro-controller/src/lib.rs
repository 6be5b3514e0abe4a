//! Channel-level control of Pololu Maestro servo controllers.
//!
//! This is the layer applications talk to. It validates channel numbers,
//! applies host-side soft limits, remembers the last target sent on each
//! channel, and runs each request/response exchange over a transport.

pub mod config;
pub mod connector;
pub mod controller;
pub mod error;
pub mod limits;
pub mod shared;
pub mod state;

pub use config::ControllerConfig;
pub use connector::connect;
pub use controller::ChannelController;
pub use error::{ControllerError, Result};
pub use limits::{ChannelLimits, ChannelRange};
pub use shared::SharedController;
pub use state::ChannelState;
