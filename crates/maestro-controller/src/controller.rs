use bytes::{Bytes, BytesMut};
use maestro_frame::{
    channel, decode_moving_state, decode_position, encode_command, Addressing, Command,
    CHANNEL_COUNT, MAX_14BIT, MAX_FRAME_SIZE,
};
use maestro_transport::Transport;
use tracing::{debug, trace, warn};

use crate::config::ControllerConfig;
use crate::error::{ControllerError, Result};
use crate::limits::ChannelLimits;
use crate::state::ChannelState;

/// Stateful front end for one Maestro connection.
///
/// Owns the transport exclusively and keeps a soft-limit and last-target
/// table for every channel. Each public operation is one request, followed
/// by a fixed-size read for queries. The protocol carries no request IDs,
/// so only one request may be in flight: every method takes `&mut self`.
/// Use [`SharedController`](crate::SharedController) to share a connection
/// across threads.
pub struct ChannelController<T> {
    transport: T,
    addressing: Addressing,
    channels: [ChannelState; CHANNEL_COUNT],
    buf: BytesMut,
}

impl<T: Transport> ChannelController<T> {
    /// Create a controller using Pololu addressing at the default device number.
    pub fn new(transport: T) -> Self {
        Self::with_addressing(transport, Addressing::default())
    }

    /// Create a controller with an explicit addressing mode.
    pub fn with_addressing(transport: T, addressing: Addressing) -> Self {
        Self {
            transport,
            addressing,
            channels: [ChannelState::default(); CHANNEL_COUNT],
            buf: BytesMut::with_capacity(MAX_FRAME_SIZE),
        }
    }

    /// Create a controller from a config (only the addressing mode applies;
    /// the transport is already open).
    pub fn with_config(transport: T, config: &ControllerConfig) -> Self {
        Self::with_addressing(transport, config.addressing)
    }

    /// The addressing mode frames are encoded with.
    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    /// Store soft limits for `channel`. Zero leaves a side unbounded.
    ///
    /// Takes effect from the next [`set_target`](Self::set_target); targets
    /// already sent are not revisited. `min > max` is stored as given.
    pub fn set_range(&mut self, channel: u8, min: u16, max: u16) -> Result<()> {
        let state = self.state_mut(channel)?;
        state.min = min;
        state.max = max;
        debug!(channel, min, max, "set channel range");
        Ok(())
    }

    /// Soft limits for `channel` as `(min, max)`.
    pub fn range(&self, channel: u8) -> Result<(u16, u16)> {
        let state = self.state(channel)?;
        Ok((state.min, state.max))
    }

    /// Snapshot of the host-side state for `channel`.
    pub fn state(&self, channel: u8) -> Result<ChannelState> {
        check_channel(channel)?;
        Ok(self.channels[usize::from(channel)])
    }

    /// Apply every range in `limits`. Validation happens before any range is
    /// stored, so a bad channel leaves the table untouched.
    pub fn apply_limits(&mut self, limits: &ChannelLimits) -> Result<()> {
        for range in &limits.channels {
            check_channel(range.channel)?;
        }
        for range in &limits.channels {
            self.set_range(range.channel, range.min, range.max)?;
        }
        Ok(())
    }

    /// Move `channel` to `target` quarter-microseconds, clamped to the soft
    /// limits. Returns the value actually sent, which is the clamped target
    /// reduced to its low 14 bits.
    pub fn set_target(&mut self, channel: u8, target: u16) -> Result<u16> {
        let state = self.state(channel)?;
        if state.is_inverted() {
            warn!(
                channel,
                min = state.min,
                max = state.max,
                "inverted range ignored; target sent unclamped"
            );
        }

        let sent = state.clamp(target) & MAX_14BIT;
        if sent != target {
            debug!(channel, requested = target, sent, "target adjusted");
        }

        self.send(&Command::SetTarget {
            channel,
            target: sent,
        })?;
        self.channels[usize::from(channel)].target = sent;
        Ok(sent)
    }

    /// Limit how fast the target of `channel` may change. 0 = unlimited.
    pub fn set_speed(&mut self, channel: u8, speed: u16) -> Result<()> {
        check_channel(channel)?;
        self.send(&Command::SetSpeed { channel, speed })
    }

    /// Limit how fast the speed of `channel` may change. 0 = unlimited.
    pub fn set_acceleration(&mut self, channel: u8, acceleration: u16) -> Result<()> {
        check_channel(channel)?;
        self.send(&Command::SetAcceleration {
            channel,
            acceleration,
        })
    }

    /// Current position of `channel` as reported by the controller.
    ///
    /// This is the pulse width the controller is generating, not a measured
    /// servo position.
    pub fn get_position(&mut self, channel: u8) -> Result<u16> {
        check_channel(channel)?;
        let reply = self.query(&Command::GetPosition { channel })?;
        Ok(decode_position(&reply)?)
    }

    /// Whether `channel` has not yet reached the last target sent from here.
    ///
    /// Always false (and sends nothing) for a channel that was never given a
    /// target, even if the output is moving for another reason.
    pub fn is_moving(&mut self, channel: u8) -> Result<bool> {
        let state = self.state(channel)?;
        if !state.has_target() {
            return Ok(false);
        }
        let position = self.get_position(channel)?;
        Ok(position != state.target)
    }

    /// Whether any channel is still moving, as reported by the controller.
    pub fn get_moving_state(&mut self) -> Result<bool> {
        let reply = self.query(&Command::GetMovingState)?;
        Ok(decode_moving_state(&reply)?)
    }

    /// Start subroutine `subroutine` of the loaded script.
    pub fn run_script_subroutine(&mut self, subroutine: u8) -> Result<()> {
        self.send(&Command::RunScriptSubroutine { subroutine })
    }

    /// Start subroutine `subroutine` with `parameter` on the script stack.
    pub fn run_script_subroutine_with_parameter(
        &mut self,
        subroutine: u8,
        parameter: u16,
    ) -> Result<()> {
        self.send(&Command::RunScriptSubroutineWithParameter {
            subroutine,
            parameter,
        })
    }

    /// Stop the running script.
    pub fn stop_script(&mut self) -> Result<()> {
        self.send(&Command::StopScript)
    }

    /// Release the transport. Safe to call repeatedly and after errors.
    pub fn close(&mut self) -> Result<()> {
        if !self.transport.is_closed() {
            debug!("closing controller");
        }
        self.transport.close()?;
        Ok(())
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the controller and return the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn state_mut(&mut self, channel: u8) -> Result<&mut ChannelState> {
        check_channel(channel)?;
        Ok(&mut self.channels[usize::from(channel)])
    }

    fn send(&mut self, command: &Command) -> Result<()> {
        self.buf.clear();
        encode_command(command, self.addressing, &mut self.buf);
        trace!(
            opcode = %command.opcode(),
            channel = ?command.channel(),
            bytes = ?&self.buf[..],
            "sending command"
        );
        self.transport.write(&self.buf)?;
        Ok(())
    }

    fn query(&mut self, command: &Command) -> Result<Bytes> {
        self.send(command)?;
        let reply = self.transport.read_exact(command.response_len())?;
        trace!(opcode = %command.opcode(), bytes = ?reply.as_ref(), "received reply");
        Ok(reply)
    }
}

impl<T> std::fmt::Debug for ChannelController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelController")
            .field("addressing", &self.addressing)
            .finish_non_exhaustive()
    }
}

fn check_channel(channel: u8) -> Result<()> {
    if channel::is_valid(channel) {
        Ok(())
    } else {
        Err(ControllerError::InvalidChannel(channel))
    }
}
