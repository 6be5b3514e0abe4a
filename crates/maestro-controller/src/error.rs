use std::path::PathBuf;

use maestro_transport::TransportError;

/// Errors that can occur in controller operations.
///
/// Every error aborts only the operation in progress; the controller stays
/// usable afterwards.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Transport-level failure (open, I/O, closed).
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// The reply did not arrive in full before the read deadline. The stream
    /// may now be offset relative to later replies; reopening is advised.
    #[error("short read: expected {expected} bytes, received {received}")]
    ShortRead { expected: usize, received: usize },

    /// Channel number outside the controller's range. Nothing was sent.
    #[error("channel {0} out of range (0-{max})", max = maestro_frame::MAX_CHANNEL)]
    InvalidChannel(u8),

    /// Reply could not be decoded.
    #[error("frame error: {0}")]
    Frame(#[from] maestro_frame::FrameError),

    /// Reading or writing a limits file failed.
    #[error("limits file {path}: {source}")]
    LimitsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another thread panicked while holding the controller.
    #[error("controller lock poisoned")]
    Poisoned,
}

impl From<TransportError> for ControllerError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ShortRead { expected, received } => {
                ControllerError::ShortRead { expected, received }
            }
            other => ControllerError::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_read_is_lifted_out_of_transport() {
        let err = ControllerError::from(TransportError::ShortRead {
            expected: 2,
            received: 0,
        });
        assert!(matches!(
            err,
            ControllerError::ShortRead {
                expected: 2,
                received: 0
            }
        ));
    }

    #[test]
    fn other_transport_errors_are_wrapped() {
        let err = ControllerError::from(TransportError::Closed);
        assert!(matches!(err, ControllerError::Transport(TransportError::Closed)));
    }

    #[test]
    fn invalid_channel_message() {
        assert_eq!(
            ControllerError::InvalidChannel(30).to_string(),
            "channel 30 out of range (0-23)"
        );
    }
}
