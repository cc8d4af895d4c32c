use std::io::Write;

use crate::models::byte_order::ByteOrder;
use crate::models::error::PipelineError;
use crate::processing::sample_codec::SampleCodec;
use crate::traits::audio_source::AudioSource;
use crate::traits::stream_writer::AudioStreamWriter;

/// Encodes an audio source as interleaved linear PCM.
///
/// The output width is the source descriptor's bit depth (channel 0
/// maximum). Each frame is assembled in a scratch buffer and written with a
/// single `write_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmStreamWriter {
    byte_order: ByteOrder,
}

impl PcmStreamWriter {
    pub fn new(byte_order: ByteOrder) -> Self {
        Self { byte_order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }
}

impl AudioStreamWriter for PcmStreamWriter {
    fn write(&self, source: &mut dyn AudioSource, target: &mut dyn Write) -> Result<u64, PipelineError> {
        let descriptor = source.descriptor();
        if descriptor.has_variable_sample_rate() {
            return Err(PipelineError::InvalidArgument(
                "cannot write audio source with variable sample rate".into(),
            ));
        }

        let bits = descriptor.max_bits_per_sample(0);
        let codec = SampleCodec::new(bits, self.byte_order).map_err(|_| {
            PipelineError::EncodingFailed(format!("cannot write unsupported sample bit depth {bits}"))
        })?;

        let channels = descriptor.channel_count() as usize;
        let sample_bytes = codec.sample_bytes();
        let mut frame = vec![0u8; channels * sample_bytes];
        let mut frames = 0u64;

        while source.advance()? {
            for (channel, slot) in frame.chunks_exact_mut(sample_bytes).enumerate() {
                codec.encode(source.sample(channel), slot);
            }
            target.write_all(&frame)?;
            frames += 1;
        }

        log::debug!(
            "pcm writer: {} frames, {} channel(s) at {} bits",
            frames,
            channels,
            bits
        );
        Ok(frames)
    }
}
