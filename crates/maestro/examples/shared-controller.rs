//! Drive several channels from separate threads over one connection.
//!
//! Run with:
//!   cargo run --example shared-controller -- /dev/ttyACM0

use std::thread;
use std::time::Duration;

use maestro::controller::SharedController;
use maestro::{connect, ControllerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyACM0".to_string());

    let shared = SharedController::new(connect(&path, &ControllerConfig::default())?);

    let workers: Vec<_> = (0..3u8)
        .map(|channel| {
            let shared = shared.clone();
            thread::spawn(move || -> maestro::controller::Result<()> {
                shared.set_speed(channel, 40)?;
                for target in [5000u16, 7000, 6000] {
                    shared.set_target(channel, target)?;
                    while shared.is_moving(channel)? {
                        thread::sleep(Duration::from_millis(25));
                    }
                }
                Ok(())
            })
        })
        .collect();

    for worker in workers {
        if let Err(err) = worker.join().map_err(|_| "worker panicked")? {
            eprintln!("worker failed: {err}");
        }
    }

    shared.close()?;
    Ok(())
}
