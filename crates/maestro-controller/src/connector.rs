use maestro_transport::{open_serial, SerialTransport};
use tracing::debug;

use crate::config::ControllerConfig;
use crate::controller::ChannelController;
use crate::error::Result;

/// Open the serial device at `path` and wrap it in a controller.
///
/// On a Maestro connected over USB this is the command port
/// (`/dev/ttyACM0` on Linux, the lower-numbered COM port on Windows).
pub fn connect(path: &str, config: &ControllerConfig) -> Result<ChannelController<SerialTransport>> {
    let transport = open_serial(path, &config.serial)?;
    debug!(path, addressing = ?config.addressing, "controller connected");
    Ok(ChannelController::with_config(transport, config))
}
