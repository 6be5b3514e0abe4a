//! Sweep one servo between two soft limits.
//!
//! Run with:
//!   cargo run --example sweep -- /dev/ttyACM0 0
//!
//! The Maestro must be in "USB Dual Port" or "UART" serial mode.

use std::thread;
use std::time::Duration;

use maestro::{connect, ControllerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "/dev/ttyACM0".to_string());
    let channel: u8 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(0);

    let mut ctl = connect(&path, &ControllerConfig::default())?;
    ctl.set_range(channel, 4000, 8000)?;
    ctl.set_speed(channel, 60)?;
    ctl.set_acceleration(channel, 10)?;

    for target in [4000u16, 8000, 6000] {
        let sent = ctl.set_target(channel, target)?;
        eprintln!("channel {channel} -> {sent}");
        while ctl.get_moving_state()? {
            thread::sleep(Duration::from_millis(20));
        }
        eprintln!("reached {}", ctl.get_position(channel)?);
    }

    ctl.close()?;
    Ok(())
}
