use std::sync::Arc;

use crate::models::descriptor::ProxyDescriptor;
use crate::models::error::PipelineError;
use crate::processing::sample_codec::SampleWidth;
use crate::traits::audio_source::AudioSource;
use crate::traits::stream_descriptor::StreamDescriptor;

/// Re-tags a source with a different fixed bit depth.
///
/// Samples pass through untouched; a PCM sink downstream quantizes them at
/// the new width.
#[derive(Debug)]
pub struct BitDepthConverter<S> {
    source: S,
    bits_per_sample: u16,
    descriptor: Arc<dyn StreamDescriptor>,
}

impl<S: AudioSource> BitDepthConverter<S> {
    /// Fails with `InvalidArgument` unless `bits_per_sample` is 8, 16, 32 or 64.
    pub fn new(source: S, bits_per_sample: u16) -> Result<Self, PipelineError> {
        SampleWidth::from_bits(bits_per_sample)
            .map_err(|e| PipelineError::InvalidArgument(e.to_string()))?;

        let base = source.descriptor();
        log::debug!(
            "bit depth: {} -> {} bits",
            base.max_bits_per_sample(0),
            bits_per_sample
        );

        Ok(Self {
            source,
            bits_per_sample,
            descriptor: ProxyDescriptor::new(base)
                .with_bits_per_sample(bits_per_sample)
                .into_shared(),
        })
    }
}

impl<S: AudioSource> AudioSource for BitDepthConverter<S> {
    fn advance(&mut self) -> Result<bool, PipelineError> {
        self.source.advance()
    }

    fn sample(&self, channel: usize) -> f64 {
        self.source.sample(channel)
    }

    fn descriptor(&self) -> Arc<dyn StreamDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn current_sample_rate(&self, channel: usize) -> u32 {
        self.source.current_sample_rate(channel)
    }

    fn current_bit_rate(&self, _channel: usize) -> Result<u16, PipelineError> {
        Ok(self.bits_per_sample)
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        self.source.close()
    }
}
