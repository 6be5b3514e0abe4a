use std::sync::{Arc, Mutex};

use maestro_transport::Transport;

use crate::controller::ChannelController;
use crate::error::{ControllerError, Result};

/// A controller that can be cloned across threads.
///
/// Every call holds the lock for the full request/response exchange, so a
/// query's reply can never be interleaved with another thread's command.
pub struct SharedController<T> {
    inner: Arc<Mutex<ChannelController<T>>>,
}

impl<T> Clone for SharedController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SharedController<T> {
    pub fn new(controller: ChannelController<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    /// Run `f` with exclusive access to the controller.
    ///
    /// Use this to group several operations (e.g. set a target, then poll
    /// until it is reached) without another thread interleaving.
    pub fn with<R>(&self, f: impl FnOnce(&mut ChannelController<T>) -> Result<R>) -> Result<R> {
        let mut guard = self.inner.lock().map_err(|_| ControllerError::Poisoned)?;
        f(&mut guard)
    }

    pub fn set_range(&self, channel: u8, min: u16, max: u16) -> Result<()> {
        self.with(|ctl| ctl.set_range(channel, min, max))
    }

    pub fn set_target(&self, channel: u8, target: u16) -> Result<u16> {
        self.with(|ctl| ctl.set_target(channel, target))
    }

    pub fn set_speed(&self, channel: u8, speed: u16) -> Result<()> {
        self.with(|ctl| ctl.set_speed(channel, speed))
    }

    pub fn set_acceleration(&self, channel: u8, acceleration: u16) -> Result<()> {
        self.with(|ctl| ctl.set_acceleration(channel, acceleration))
    }

    pub fn get_position(&self, channel: u8) -> Result<u16> {
        self.with(|ctl| ctl.get_position(channel))
    }

    pub fn is_moving(&self, channel: u8) -> Result<bool> {
        self.with(|ctl| ctl.is_moving(channel))
    }

    pub fn get_moving_state(&self) -> Result<bool> {
        self.with(|ctl| ctl.get_moving_state())
    }

    pub fn run_script_subroutine(&self, subroutine: u8) -> Result<()> {
        self.with(|ctl| ctl.run_script_subroutine(subroutine))
    }

    pub fn run_script_subroutine_with_parameter(&self, subroutine: u8, parameter: u16) -> Result<()> {
        self.with(|ctl| ctl.run_script_subroutine_with_parameter(subroutine, parameter))
    }

    pub fn stop_script(&self) -> Result<()> {
        self.with(|ctl| ctl.stop_script())
    }

    pub fn close(&self) -> Result<()> {
        self.with(|ctl| ctl.close())
    }
}

impl<T> std::fmt::Debug for SharedController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedController")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
