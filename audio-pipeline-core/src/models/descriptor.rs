use std::sync::Arc;

use crate::traits::stream_descriptor::{DescriptorFlags, StreamDescriptor};

/// Descriptor of a fixed-format linear PCM stream.
///
/// Every channel shares the same bit depth and sample rate, so the minimum
/// and maximum accessors always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmStreamDescriptor {
    channels: u16,
    bits_per_sample: u16,
    sample_rate: u32,
    sample_count: Option<u64>,
    flags: DescriptorFlags,
}

impl PcmStreamDescriptor {
    pub fn new(channels: u16, bits_per_sample: u16, sample_rate: u32, sample_count: Option<u64>) -> Self {
        Self {
            channels,
            bits_per_sample,
            sample_rate,
            sample_count,
            flags: DescriptorFlags::empty(),
        }
    }

    /// Same descriptor with the given capability flags.
    pub fn with_flags(mut self, flags: DescriptorFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn into_shared(self) -> Arc<dyn StreamDescriptor> {
        Arc::new(self)
    }
}

impl StreamDescriptor for PcmStreamDescriptor {
    fn channel_count(&self) -> u16 {
        self.channels
    }

    fn flags(&self) -> DescriptorFlags {
        self.flags
    }

    fn min_bits_per_sample(&self, _channel: usize) -> u16 {
        self.bits_per_sample
    }

    fn max_bits_per_sample(&self, _channel: usize) -> u16 {
        self.bits_per_sample
    }

    fn min_sample_rate(&self, _channel: usize) -> u32 {
        self.sample_rate
    }

    fn max_sample_rate(&self, _channel: usize) -> u32 {
        self.sample_rate
    }

    fn sample_count(&self) -> Option<u64> {
        self.sample_count
    }
}

/// Descriptor that forwards every accessor to a base descriptor, except the
/// fields explicitly overridden on it.
///
/// The base is shared, never mutated. Overriding the sample rate pins both
/// the minimum and maximum rate of every channel, and likewise for bit depth.
#[derive(Debug, Clone)]
pub struct ProxyDescriptor {
    base: Arc<dyn StreamDescriptor>,
    channel_count: Option<u16>,
    bits_per_sample: Option<u16>,
    sample_rate: Option<u32>,
    // Outer `None` forwards, inner `None` means "unknown".
    sample_count: Option<Option<u64>>,
}

impl ProxyDescriptor {
    pub fn new(base: Arc<dyn StreamDescriptor>) -> Self {
        Self {
            base,
            channel_count: None,
            bits_per_sample: None,
            sample_rate: None,
            sample_count: None,
        }
    }

    pub fn with_channel_count(mut self, channels: u16) -> Self {
        self.channel_count = Some(channels);
        self
    }

    pub fn with_bits_per_sample(mut self, bits: u16) -> Self {
        self.bits_per_sample = Some(bits);
        self
    }

    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    pub fn with_sample_count(mut self, count: Option<u64>) -> Self {
        self.sample_count = Some(count);
        self
    }

    /// The descriptor this proxy forwards to.
    pub fn base(&self) -> &Arc<dyn StreamDescriptor> {
        &self.base
    }

    pub fn into_shared(self) -> Arc<dyn StreamDescriptor> {
        Arc::new(self)
    }
}

impl StreamDescriptor for ProxyDescriptor {
    fn channel_count(&self) -> u16 {
        self.channel_count.unwrap_or_else(|| self.base.channel_count())
    }

    fn flags(&self) -> DescriptorFlags {
        let mut flags = self.base.flags();
        if self.bits_per_sample.is_some() {
            flags.remove(DescriptorFlags::VARIABLE_BITS_PER_SAMPLE);
        }
        if self.sample_rate.is_some() {
            flags.remove(DescriptorFlags::VARIABLE_SAMPLE_RATE);
        }
        flags
    }

    fn min_bits_per_sample(&self, channel: usize) -> u16 {
        self.bits_per_sample
            .unwrap_or_else(|| self.base.min_bits_per_sample(channel))
    }

    fn max_bits_per_sample(&self, channel: usize) -> u16 {
        self.bits_per_sample
            .unwrap_or_else(|| self.base.max_bits_per_sample(channel))
    }

    fn min_sample_rate(&self, channel: usize) -> u32 {
        self.sample_rate.unwrap_or_else(|| self.base.min_sample_rate(channel))
    }

    fn max_sample_rate(&self, channel: usize) -> u32 {
        self.sample_rate.unwrap_or_else(|| self.base.max_sample_rate(channel))
    }

    fn sample_count(&self) -> Option<u64> {
        self.sample_count.unwrap_or_else(|| self.base.sample_count())
    }
}
