use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::cmd::{parse_duration, ConnectArgs, WatchArgs};
use crate::exit::{controller_error, CliError, CliResult, SUCCESS};
use crate::output::{print_positions, OutputFormat, PositionReading};

pub fn run(args: WatchArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let mut ctl = conn.open()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut polls = 0usize;
    while running.load(Ordering::SeqCst) {
        let moving = ctl
            .get_moving_state()
            .map_err(|err| controller_error("moving state failed", err))?;

        let mut readings = Vec::with_capacity(args.channels.len());
        for &channel in &args.channels {
            let position = ctl.get_position(channel).map_err(|err| {
                controller_error(&format!("position of channel {channel} failed"), err)
            })?;
            let mut reading = PositionReading::new(channel, position);
            reading.moving = Some(moving);
            readings.push(reading);
        }
        print_positions(&readings, format);

        polls += 1;
        if args.count.is_some_and(|count| polls >= count) {
            break;
        }
        thread::sleep(interval);
    }

    tracing::debug!(polls, "watch finished");
    ctl.close()
        .map_err(|err| controller_error("close failed", err))?;
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
