use std::fmt;

/// Command bytes as sent after the Pololu `0xAA <device>` header.
///
/// The compact protocol uses the same values with bit 7 set; see
/// [`Addressing::command_byte`](crate::Addressing::command_byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    SetTarget = 0x04,
    SetSpeed = 0x07,
    SetAcceleration = 0x09,
    GetPosition = 0x10,
    GetMovingState = 0x13,
    StopScript = 0x24,
    RunScriptSubroutine = 0x27,
    RunScriptSubroutineWithParameter = 0x28,
}

impl Opcode {
    /// The raw command byte.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Human-readable name for logs and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::SetTarget => "set_target",
            Opcode::SetSpeed => "set_speed",
            Opcode::SetAcceleration => "set_acceleration",
            Opcode::GetPosition => "get_position",
            Opcode::GetMovingState => "get_moving_state",
            Opcode::StopScript => "stop_script",
            Opcode::RunScriptSubroutine => "run_script_subroutine",
            Opcode::RunScriptSubroutineWithParameter => "run_script_subroutine_with_parameter",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One protocol request.
///
/// Channel and subroutine numbers go on the wire as raw bytes; nothing here
/// checks them against the board's channel count. Targets, speeds,
/// accelerations and script parameters are 14-bit quantities: bits above
/// bit 13 are dropped by the 7/7 split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move `channel` to `target` quarter-microseconds.
    SetTarget { channel: u8, target: u16 },
    /// Limit the rate of target changes, in 0.25 µs / 10 ms. 0 = unlimited.
    SetSpeed { channel: u8, speed: u16 },
    /// Limit the rate of speed changes. 0 = unlimited.
    SetAcceleration { channel: u8, acceleration: u16 },
    /// Query the current position of `channel`.
    GetPosition { channel: u8 },
    /// Query whether any channel is still moving towards its target.
    GetMovingState,
    /// Start a subroutine of the loaded script.
    RunScriptSubroutine { subroutine: u8 },
    /// Start a subroutine with `parameter` pushed on the script stack.
    RunScriptSubroutineWithParameter { subroutine: u8, parameter: u16 },
    /// Stop the running script.
    StopScript,
}

impl Command {
    /// The opcode selecting this command.
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::SetTarget { .. } => Opcode::SetTarget,
            Command::SetSpeed { .. } => Opcode::SetSpeed,
            Command::SetAcceleration { .. } => Opcode::SetAcceleration,
            Command::GetPosition { .. } => Opcode::GetPosition,
            Command::GetMovingState => Opcode::GetMovingState,
            Command::RunScriptSubroutine { .. } => Opcode::RunScriptSubroutine,
            Command::RunScriptSubroutineWithParameter { .. } => {
                Opcode::RunScriptSubroutineWithParameter
            }
            Command::StopScript => Opcode::StopScript,
        }
    }

    /// Number of payload bytes following the command byte.
    pub fn payload_len(&self) -> usize {
        match self {
            Command::SetTarget { .. }
            | Command::SetSpeed { .. }
            | Command::SetAcceleration { .. }
            | Command::RunScriptSubroutineWithParameter { .. } => 3,
            Command::GetPosition { .. } | Command::RunScriptSubroutine { .. } => 1,
            Command::GetMovingState | Command::StopScript => 0,
        }
    }

    /// Number of bytes the controller sends back, or 0 for commands without
    /// a reply.
    pub fn response_len(&self) -> usize {
        match self {
            Command::GetPosition { .. } => 2,
            Command::GetMovingState => 1,
            _ => 0,
        }
    }

    /// The channel this command addresses, if any.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Command::SetTarget { channel, .. }
            | Command::SetSpeed { channel, .. }
            | Command::SetAcceleration { channel, .. }
            | Command::GetPosition { channel } => Some(channel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_table() {
        assert_eq!(Opcode::SetTarget.as_byte(), 0x04);
        assert_eq!(Opcode::SetSpeed.as_byte(), 0x07);
        assert_eq!(Opcode::SetAcceleration.as_byte(), 0x09);
        assert_eq!(Opcode::GetPosition.as_byte(), 0x10);
        assert_eq!(Opcode::GetMovingState.as_byte(), 0x13);
        assert_eq!(Opcode::StopScript.as_byte(), 0x24);
        assert_eq!(Opcode::RunScriptSubroutine.as_byte(), 0x27);
        assert_eq!(Opcode::RunScriptSubroutineWithParameter.as_byte(), 0x28);
    }

    #[test]
    fn response_sizes() {
        assert_eq!(Command::GetPosition { channel: 3 }.response_len(), 2);
        assert_eq!(Command::GetMovingState.response_len(), 1);
        assert_eq!(
            Command::SetTarget {
                channel: 0,
                target: 6000
            }
            .response_len(),
            0
        );
        assert_eq!(Command::StopScript.response_len(), 0);
    }

    #[test]
    fn channel_accessor() {
        assert_eq!(Command::SetSpeed { channel: 5, speed: 1 }.channel(), Some(5));
        assert_eq!(Command::RunScriptSubroutine { subroutine: 5 }.channel(), None);
        assert_eq!(Command::GetMovingState.channel(), None);
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(Opcode::GetMovingState.to_string(), "get_moving_state");
    }
}
