use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use maestro_controller::{connect, ChannelController, ChannelLimits, ControllerConfig};
use maestro_frame::{Addressing, DEFAULT_DEVICE_ADDRESS};
use maestro_transport::{SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};

use crate::exit::{controller_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod motion;
pub mod query;
pub mod script;
pub mod target;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move a channel to a target position (quarter-microseconds).
    Target(TargetArgs),
    /// Set the speed limit of a channel.
    Speed(SpeedArgs),
    /// Set the acceleration limit of a channel.
    Accel(AccelArgs),
    /// Read channel positions.
    Position(PositionArgs),
    /// Report whether any channel is still moving.
    Moving,
    /// Run or stop the onboard script.
    Script(ScriptArgs),
    /// Poll channel positions until interrupted.
    Watch(WatchArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Target(args) => target::run(args, conn, format),
        Command::Speed(args) => motion::run_speed(args, conn, format),
        Command::Accel(args) => motion::run_accel(args, conn, format),
        Command::Position(args) => query::run_position(args, conn, format),
        Command::Moving => query::run_moving(conn, format),
        Command::Script(args) => script::run(args, conn, format),
        Command::Watch(args) => watch::run(args, conn, format),
        Command::Version(args) => version::run(args),
    }
}

/// Connection parameters shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Serial device of the Maestro command port.
    #[arg(
        long,
        short = 'p',
        env = "MAESTRO_PORT",
        default_value = "/dev/ttyACM0",
        global = true
    )]
    pub port: String,
    /// Baud rate (UART only; ignored by USB ports).
    #[arg(long, env = "MAESTRO_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,
    /// Device number placed in the Pololu header.
    #[arg(long, env = "MAESTRO_DEVICE", default_value_t = DEFAULT_DEVICE_ADDRESS, global = true)]
    pub device: u8,
    /// Use the compact protocol (no device header) on a dedicated link.
    #[arg(long, global = true)]
    pub compact: bool,
    /// Read deadline for replies (e.g. 500ms, 2s).
    #[arg(long, default_value = "500ms", global = true)]
    pub timeout: String,
    /// JSON file with per-channel soft limits.
    #[arg(long, env = "MAESTRO_LIMITS", value_name = "FILE", global = true)]
    pub limits: Option<PathBuf>,
}

impl ConnectArgs {
    pub fn config(&self) -> CliResult<ControllerConfig> {
        let addressing = if self.compact {
            Addressing::Compact
        } else {
            Addressing::Pololu {
                device: self.device,
            }
        };
        Ok(ControllerConfig {
            addressing,
            serial: SerialConfig {
                baud_rate: self.baud,
                read_timeout: parse_duration(&self.timeout)?,
            },
        })
    }

    /// Open the port and apply any configured limits.
    pub fn open(&self) -> CliResult<ChannelController<SerialTransport>> {
        let config = self.config()?;
        let mut ctl =
            connect(&self.port, &config).map_err(|err| controller_error("connect failed", err))?;
        if let Some(path) = &self.limits {
            let limits = ChannelLimits::load(path)
                .map_err(|err| controller_error("limits load failed", err))?;
            ctl.apply_limits(&limits)
                .map_err(|err| controller_error("limits apply failed", err))?;
            tracing::debug!(path = %path.display(), count = limits.channels.len(), "applied limits");
        }
        Ok(ctl)
    }
}

fn channel_arg() -> clap::builder::RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(0..=i64::from(maestro_frame::MAX_CHANNEL))
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Channel number (0-23).
    #[arg(value_parser = channel_arg())]
    pub channel: u8,
    /// Target in quarter-microseconds (6000 = 1500us).
    pub target: u16,
    /// Lower soft limit applied before sending.
    #[arg(long)]
    pub min: Option<u16>,
    /// Upper soft limit applied before sending.
    #[arg(long)]
    pub max: Option<u16>,
    /// Block until the controller reports all channels settled.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct SpeedArgs {
    /// Channel number (0-23).
    #[arg(value_parser = channel_arg())]
    pub channel: u8,
    /// Speed in 0.25us per 10ms (0 = unlimited).
    pub speed: u16,
}

#[derive(Args, Debug)]
pub struct AccelArgs {
    /// Channel number (0-23).
    #[arg(value_parser = channel_arg())]
    pub channel: u8,
    /// Acceleration (0 = unlimited, 1 = slowest).
    pub accel: u16,
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    /// Channels to read.
    #[arg(required = true, num_args = 1.., value_parser = channel_arg())]
    pub channels: Vec<u8>,
}

#[derive(Args, Debug)]
pub struct ScriptArgs {
    #[command(subcommand)]
    pub action: ScriptAction,
}

#[derive(Subcommand, Debug)]
pub enum ScriptAction {
    /// Start a subroutine of the loaded script.
    Run {
        /// Subroutine number.
        subroutine: u8,
        /// Value pushed on the script stack before the call.
        #[arg(long)]
        param: Option<u16>,
    },
    /// Stop the running script.
    Stop,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Channels to poll.
    #[arg(required = true, num_args = 1.., value_parser = channel_arg())]
    pub channels: Vec<u8>,
    /// Delay between polls (e.g. 100ms, 1s).
    #[arg(long, default_value = "200ms")]
    pub interval: String,
    /// Exit after N polls.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> ConnectArgs {
        ConnectArgs {
            port: "/dev/ttyACM0".to_string(),
            baud: DEFAULT_BAUD_RATE,
            device: 12,
            compact: false,
            timeout: "250ms".to_string(),
            limits: None,
        }
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn config_from_args() {
        let config = conn().config().unwrap();
        assert_eq!(config.addressing, Addressing::Pololu { device: 12 });
        assert_eq!(config.serial.read_timeout, Duration::from_millis(250));

        let compact = ConnectArgs {
            compact: true,
            ..conn()
        };
        assert_eq!(compact.config().unwrap().addressing, Addressing::Compact);
    }

    #[test]
    fn open_missing_port_fails_with_transport_code() {
        let args = ConnectArgs {
            port: "/dev/maestro-cli-missing".to_string(),
            ..conn()
        };
        let err = args.open().unwrap_err();
        assert_eq!(err.code, crate::exit::TRANSPORT_ERROR);
    }
}
