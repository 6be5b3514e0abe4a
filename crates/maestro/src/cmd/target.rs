use std::thread;
use std::time::{Duration, Instant};

use maestro_controller::ChannelController;
use maestro_transport::Transport;

use crate::cmd::{parse_duration, ConnectArgs, TargetArgs};
use crate::exit::{controller_error, CliResult, SUCCESS, TIMEOUT};
use crate::output::{print_report, CommandReport, OutputFormat};

const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(20);

pub fn run(args: TargetArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = if args.wait {
        Some(parse_duration(&args.wait_timeout)?)
    } else {
        None
    };

    let mut ctl = conn.open()?;

    if args.min.is_some() || args.max.is_some() {
        let (min, max) = ctl
            .range(args.channel)
            .map_err(|err| controller_error("range lookup failed", err))?;
        ctl.set_range(
            args.channel,
            args.min.unwrap_or(min),
            args.max.unwrap_or(max),
        )
        .map_err(|err| controller_error("set range failed", err))?;
    }

    let sent = ctl
        .set_target(args.channel, args.target)
        .map_err(|err| controller_error("set target failed", err))?;
    let mut report = CommandReport::new("set_target")
        .channel(args.channel)
        .values(args.target, sent);

    let mut code = SUCCESS;
    if let Some(timeout) = wait_timeout {
        let moving = wait_until_settled(&mut ctl, timeout, SETTLE_POLL_INTERVAL)
            .map_err(|err| controller_error("wait failed", err))?;
        if moving {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "channels still moving");
            code = TIMEOUT;
        }
        report = report.moving(moving);
    }

    print_report(&report, format);
    ctl.close()
        .map_err(|err| controller_error("close failed", err))?;
    Ok(code)
}

/// Poll the device-reported moving state until it clears or `timeout`
/// elapses. Returns the last observed state.
fn wait_until_settled<T: Transport>(
    ctl: &mut ChannelController<T>,
    timeout: Duration,
    poll: Duration,
) -> maestro_controller::Result<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        let moving = ctl.get_moving_state()?;
        if !moving || Instant::now() >= deadline {
            return Ok(moving);
        }
        thread::sleep(poll);
    }
}
