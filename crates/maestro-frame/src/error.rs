/// Errors that can occur while decoding Maestro responses.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// A fixed-size response was decoded from the wrong number of bytes.
    #[error("response length mismatch (expected {expected} bytes, got {actual})")]
    ResponseLength { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
