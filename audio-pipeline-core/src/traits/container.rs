use std::sync::Arc;

use crate::models::error::PipelineError;
use crate::traits::audio_source::AudioSource;
use crate::traits::stream_descriptor::StreamDescriptor;

/// Reader for an audio container format (e.g. WAV).
///
/// The container supplies a descriptor and the raw sample stream; decoding is
/// delegated to the source returned by [`into_audio_source`](Self::into_audio_source).
pub trait ContainerFormatReader {
    type Source: AudioSource;

    /// Descriptor of the contained audio stream.
    fn descriptor(&self) -> Result<Arc<dyn StreamDescriptor>, PipelineError>;

    /// Consume the reader and decode the contained stream on the fly.
    fn into_audio_source(self) -> Result<Self::Source, PipelineError>;
}

/// Writer for an audio container format.
pub trait ContainerFormatWriter {
    /// Write the container framing plus the encoded samples of `source`.
    ///
    /// Returns the number of frames written.
    fn write(&mut self, source: &mut dyn AudioSource) -> Result<u64, PipelineError>;
}
