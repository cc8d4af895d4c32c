use std::sync::Arc;

use crate::models::error::PipelineError;
use crate::traits::stream_descriptor::StreamDescriptor;

/// Pull-based source of normalized audio samples.
///
/// A source advances one frame (one sample per channel) at a time. After
/// [`advance`](AudioSource::advance) returns `true`, [`sample`](AudioSource::sample)
/// is valid for every channel until the next advance. Values are normalized
/// to `[-1.0, 1.0]`.
///
/// Transforms own the source they wrap. [`close`](AudioSource::close) on the
/// outermost stage closes every stage beneath it.
pub trait AudioSource {
    /// Read and buffer the next frame.
    ///
    /// Returns `false` once the end of the stream has been reached. May block
    /// on the underlying byte stream.
    fn advance(&mut self) -> Result<bool, PipelineError>;

    /// Normalized sample of `channel` in the current frame.
    ///
    /// Reads as silence (`0.0`) before the first successful advance.
    ///
    /// # Panics
    ///
    /// If `channel` is not below the descriptor's channel count.
    fn sample(&self, channel: usize) -> f64;

    fn descriptor(&self) -> Arc<dyn StreamDescriptor>;

    /// Sample rate in effect at the current stream position.
    fn current_sample_rate(&self, channel: usize) -> u32;

    /// Bit depth of the current sample. Not every source can answer this.
    fn current_bit_rate(&self, channel: usize) -> Result<u16, PipelineError>;

    /// Release the underlying stream and every stage beneath this one.
    fn close(&mut self) -> Result<(), PipelineError>;
}

/// Capability of sources whose stream position can be moved arbitrarily.
pub trait SeekableAudioSource: AudioSource {
    /// Move back to the beginning of the stream.
    fn rewind(&mut self) -> Result<(), PipelineError>;

    /// Position the stream so that the next advance yields frame `position`.
    fn seek_position(&mut self, position: u64) -> Result<(), PipelineError>;

    /// Skip `frames` frames forward.
    fn skip(&mut self, frames: u64) -> Result<(), PipelineError>;
}

impl<S: AudioSource + ?Sized> AudioSource for Box<S> {
    fn advance(&mut self) -> Result<bool, PipelineError> {
        (**self).advance()
    }

    fn sample(&self, channel: usize) -> f64 {
        (**self).sample(channel)
    }

    fn descriptor(&self) -> Arc<dyn StreamDescriptor> {
        (**self).descriptor()
    }

    fn current_sample_rate(&self, channel: usize) -> u32 {
        (**self).current_sample_rate(channel)
    }

    fn current_bit_rate(&self, channel: usize) -> Result<u16, PipelineError> {
        (**self).current_bit_rate(channel)
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        (**self).close()
    }
}

impl<S: AudioSource + ?Sized> AudioSource for &mut S {
    fn advance(&mut self) -> Result<bool, PipelineError> {
        (**self).advance()
    }

    fn sample(&self, channel: usize) -> f64 {
        (**self).sample(channel)
    }

    fn descriptor(&self) -> Arc<dyn StreamDescriptor> {
        (**self).descriptor()
    }

    fn current_sample_rate(&self, channel: usize) -> u32 {
        (**self).current_sample_rate(channel)
    }

    fn current_bit_rate(&self, channel: usize) -> Result<u16, PipelineError> {
        (**self).current_bit_rate(channel)
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        (**self).close()
    }
}
