use thiserror::Error;

/// Errors that can occur while building or pulling an audio pipeline.
///
/// Every variant aborts the operation that produced it. Nothing in the
/// pipeline retries or downgrades an error to a warning.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad construction parameters. Checked once, never recoverable mid-stream.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Failure of the underlying byte stream, propagated unchanged.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decoding failed: {0}")]
    DecodingFailed(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    /// Malformed or unsupported container header.
    #[error("invalid audio format: {0}")]
    InvalidAudioFormat(String),

    #[error("index out of range: {0}")]
    IndexOutOfRange(String),
}

impl PipelineError {
    /// Whether this error originates from the underlying byte stream.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
