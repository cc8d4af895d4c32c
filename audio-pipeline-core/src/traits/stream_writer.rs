use std::io::Write;

use crate::models::error::PipelineError;
use crate::traits::audio_source::AudioSource;

/// Encodes an audio source into a byte stream.
pub trait AudioStreamWriter {
    /// Drain `source` and write its encoded samples to `target`.
    ///
    /// Returns the number of frames written. Output already written when an
    /// error occurs is not rolled back.
    fn write(&self, source: &mut dyn AudioSource, target: &mut dyn Write) -> Result<u64, PipelineError>;
}
