use std::sync::Arc;

use crate::models::descriptor::ProxyDescriptor;
use crate::models::error::PipelineError;
use crate::traits::audio_source::AudioSource;
use crate::traits::stream_descriptor::StreamDescriptor;

/// Mixes every channel of a source down to a single channel by averaging.
#[derive(Debug)]
pub struct MonoDownmix<S> {
    source: S,
    source_channels: usize,
    descriptor: Arc<dyn StreamDescriptor>,
}

impl<S: AudioSource> MonoDownmix<S> {
    pub fn new(source: S) -> Self {
        let base = source.descriptor();
        let source_channels = base.channel_count() as usize;
        log::debug!("mono downmix: {} channel(s) -> 1", source_channels);

        Self {
            source,
            source_channels,
            descriptor: ProxyDescriptor::new(base).with_channel_count(1).into_shared(),
        }
    }
}

impl<S: AudioSource> AudioSource for MonoDownmix<S> {
    fn advance(&mut self) -> Result<bool, PipelineError> {
        self.source.advance()
    }

    fn sample(&self, channel: usize) -> f64 {
        assert!(channel == 0, "mono downmix has a single channel, got {channel}");
        if self.source_channels == 1 {
            return self.source.sample(0);
        }
        let sum: f64 = (0..self.source_channels).map(|c| self.source.sample(c)).sum();
        sum / self.source_channels as f64
    }

    fn descriptor(&self) -> Arc<dyn StreamDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn current_sample_rate(&self, _channel: usize) -> u32 {
        self.source.current_sample_rate(0)
    }

    fn current_bit_rate(&self, _channel: usize) -> Result<u16, PipelineError> {
        self.source.current_bit_rate(0)
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        self.source.close()
    }
}
