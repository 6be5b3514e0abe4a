use crate::cmd::{AccelArgs, ConnectArgs, SpeedArgs};
use crate::exit::{controller_error, CliResult, SUCCESS};
use crate::output::{print_report, CommandReport, OutputFormat};

pub fn run_speed(args: SpeedArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut ctl = conn.open()?;
    ctl.set_speed(args.channel, args.speed)
        .map_err(|err| controller_error("set speed failed", err))?;
    print_report(
        &CommandReport::new("set_speed")
            .channel(args.channel)
            .values(args.speed, args.speed),
        format,
    );
    ctl.close()
        .map_err(|err| controller_error("close failed", err))?;
    Ok(SUCCESS)
}

pub fn run_accel(args: AccelArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut ctl = conn.open()?;
    ctl.set_acceleration(args.channel, args.accel)
        .map_err(|err| controller_error("set acceleration failed", err))?;
    print_report(
        &CommandReport::new("set_acceleration")
            .channel(args.channel)
            .values(args.accel, args.accel),
        format,
    );
    ctl.close()
        .map_err(|err| controller_error("close failed", err))?;
    Ok(SUCCESS)
}
