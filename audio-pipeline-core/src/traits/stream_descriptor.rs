use std::fmt;

use bitflags::bitflags;

use crate::models::error::PipelineError;

bitflags! {
    /// Capability flags of an audio stream.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DescriptorFlags: u32 {
        /// Bit depth may change between samples.
        const VARIABLE_BITS_PER_SAMPLE = 0x0000_0001;
        /// Sample rate may change within the stream.
        const VARIABLE_SAMPLE_RATE     = 0x0000_0002;
    }
}

/// Immutable metadata describing an audio stream.
///
/// Every stage of a pipeline exposes one. Derived stages wrap the descriptor
/// of the stage they own in a [`ProxyDescriptor`](crate::ProxyDescriptor)
/// and override only what they change.
pub trait StreamDescriptor: fmt::Debug {
    /// Number of audio channels (1 = mono, 2 = stereo, ...).
    fn channel_count(&self) -> u16;

    fn flags(&self) -> DescriptorFlags;

    fn min_bits_per_sample(&self, channel: usize) -> u16;

    fn max_bits_per_sample(&self, channel: usize) -> u16;

    fn min_sample_rate(&self, channel: usize) -> u32;

    fn max_sample_rate(&self, channel: usize) -> u32;

    /// Total number of frames in the stream, `None` if unknown.
    fn sample_count(&self) -> Option<u64>;

    fn has_variable_bits_per_sample(&self) -> bool {
        self.flags().contains(DescriptorFlags::VARIABLE_BITS_PER_SAMPLE)
    }

    fn has_variable_sample_rate(&self) -> bool {
        self.flags().contains(DescriptorFlags::VARIABLE_SAMPLE_RATE)
    }
}

/// Check the structural invariants of a descriptor.
///
/// A stream needs at least one channel, and a stream without variable flags
/// must report identical minimum and maximum values for every channel.
pub fn validate_integrity(descriptor: &dyn StreamDescriptor) -> Result<(), PipelineError> {
    let channels = descriptor.channel_count();
    if channels == 0 {
        return Err(PipelineError::InvalidArgument("stream must have at least one channel".into()));
    }

    for channel in 0..channels as usize {
        let min_bits = descriptor.min_bits_per_sample(channel);
        let max_bits = descriptor.max_bits_per_sample(channel);
        if min_bits > max_bits {
            return Err(PipelineError::InvalidArgument(format!(
                "channel {channel}: minimum bit depth {min_bits} exceeds maximum {max_bits}"
            )));
        }
        if !descriptor.has_variable_bits_per_sample() && min_bits != max_bits {
            return Err(PipelineError::InvalidArgument(format!(
                "channel {channel}: fixed bit depth stream reports range {min_bits}..{max_bits}"
            )));
        }

        let min_rate = descriptor.min_sample_rate(channel);
        let max_rate = descriptor.max_sample_rate(channel);
        if min_rate > max_rate {
            return Err(PipelineError::InvalidArgument(format!(
                "channel {channel}: minimum sample rate {min_rate} exceeds maximum {max_rate}"
            )));
        }
        if !descriptor.has_variable_sample_rate() && min_rate != max_rate {
            return Err(PipelineError::InvalidArgument(format!(
                "channel {channel}: fixed sample rate stream reports range {min_rate}..{max_rate}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct RangeDescriptor {
        flags: DescriptorFlags,
        rates: (u32, u32),
    }

    impl StreamDescriptor for RangeDescriptor {
        fn channel_count(&self) -> u16 {
            2
        }
        fn flags(&self) -> DescriptorFlags {
            self.flags
        }
        fn min_bits_per_sample(&self, _channel: usize) -> u16 {
            16
        }
        fn max_bits_per_sample(&self, _channel: usize) -> u16 {
            16
        }
        fn min_sample_rate(&self, _channel: usize) -> u32 {
            self.rates.0
        }
        fn max_sample_rate(&self, _channel: usize) -> u32 {
            self.rates.1
        }
        fn sample_count(&self) -> Option<u64> {
            None
        }
    }

    #[test]
    fn fixed_stream_with_equal_ranges_is_valid() {
        let descriptor = RangeDescriptor {
            flags: DescriptorFlags::empty(),
            rates: (44100, 44100),
        };
        assert!(validate_integrity(&descriptor).is_ok());
    }

    #[test]
    fn fixed_stream_with_rate_range_is_rejected() {
        let descriptor = RangeDescriptor {
            flags: DescriptorFlags::empty(),
            rates: (22050, 44100),
        };
        let err = validate_integrity(&descriptor).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn variable_rate_stream_may_report_range() {
        let descriptor = RangeDescriptor {
            flags: DescriptorFlags::VARIABLE_SAMPLE_RATE,
            rates: (22050, 44100),
        };
        assert!(validate_integrity(&descriptor).is_ok());
        assert!(descriptor.has_variable_sample_rate());
        assert!(!descriptor.has_variable_bits_per_sample());
    }
}
