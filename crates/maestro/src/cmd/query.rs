use crate::cmd::{ConnectArgs, PositionArgs};
use crate::exit::{controller_error, CliResult, SUCCESS};
use crate::output::{print_positions, print_report, CommandReport, OutputFormat, PositionReading};

pub fn run_position(args: PositionArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut ctl = conn.open()?;

    let mut readings = Vec::with_capacity(args.channels.len());
    for &channel in &args.channels {
        let position = ctl
            .get_position(channel)
            .map_err(|err| controller_error(&format!("position of channel {channel} failed"), err))?;
        readings.push(PositionReading::new(channel, position));
    }

    print_positions(&readings, format);
    ctl.close()
        .map_err(|err| controller_error("close failed", err))?;
    Ok(SUCCESS)
}

pub fn run_moving(conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut ctl = conn.open()?;
    let moving = ctl
        .get_moving_state()
        .map_err(|err| controller_error("moving state failed", err))?;
    print_report(&CommandReport::new("get_moving_state").moving(moving), format);
    ctl.close()
        .map_err(|err| controller_error("close failed", err))?;
    Ok(SUCCESS)
}
