use std::sync::Arc;

use crate::models::error::PipelineError;
use crate::traits::audio_source::{AudioSource, SeekableAudioSource};
use crate::traits::stream_descriptor::StreamDescriptor;

/// In-memory audio source backed by interleaved `f64` samples.
///
/// Samples are returned as stored; they are not clamped to `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct ArraySource {
    descriptor: Arc<dyn StreamDescriptor>,
    data: Vec<f64>,
    channels: usize,
    current: Option<u64>,
    next_frame: u64,
}

impl ArraySource {
    /// `data` is interleaved like a multi-channel PCM stream and must hold a
    /// whole number of frames.
    pub fn new(descriptor: Arc<dyn StreamDescriptor>, data: Vec<f64>) -> Result<Self, PipelineError> {
        let channels = descriptor.channel_count() as usize;
        if channels == 0 {
            return Err(PipelineError::InvalidArgument("stream must have at least one channel".into()));
        }
        if data.len() % channels != 0 {
            return Err(PipelineError::InvalidArgument(format!(
                "{} samples do not form whole frames of {channels} channels",
                data.len()
            )));
        }

        Ok(Self {
            descriptor,
            data,
            channels,
            current: None,
            next_frame: 0,
        })
    }

    /// Number of frames held.
    pub fn frame_count(&self) -> u64 {
        (self.data.len() / self.channels) as u64
    }

    /// Index of the current frame, `None` before the first advance.
    pub fn position(&self) -> Option<u64> {
        self.current
    }
}

impl AudioSource for ArraySource {
    fn advance(&mut self) -> Result<bool, PipelineError> {
        if self.next_frame >= self.frame_count() {
            self.current = None;
            return Ok(false);
        }
        self.current = Some(self.next_frame);
        self.next_frame += 1;
        Ok(true)
    }

    fn sample(&self, channel: usize) -> f64 {
        assert!(channel < self.channels, "channel {channel} out of range");
        match self.current {
            Some(frame) => self.data[frame as usize * self.channels + channel],
            None => 0.0,
        }
    }

    fn descriptor(&self) -> Arc<dyn StreamDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn current_sample_rate(&self, channel: usize) -> u32 {
        self.descriptor.max_sample_rate(channel)
    }

    fn current_bit_rate(&self, channel: usize) -> Result<u16, PipelineError> {
        Ok(self.descriptor.max_bits_per_sample(channel))
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

impl SeekableAudioSource for ArraySource {
    fn rewind(&mut self) -> Result<(), PipelineError> {
        self.seek_position(0)
    }

    fn seek_position(&mut self, position: u64) -> Result<(), PipelineError> {
        if position > self.frame_count() {
            return Err(PipelineError::InvalidArgument(format!(
                "position {position} beyond end of {} frames",
                self.frame_count()
            )));
        }
        self.current = None;
        self.next_frame = position;
        Ok(())
    }

    fn skip(&mut self, frames: u64) -> Result<(), PipelineError> {
        self.current = None;
        self.next_frame = self.next_frame.saturating_add(frames).min(self.frame_count());
        Ok(())
    }
}
