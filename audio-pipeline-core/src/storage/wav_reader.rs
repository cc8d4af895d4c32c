use std::io::Read;
use std::sync::Arc;

use crate::models::error::PipelineError;
use crate::processing::wav_format::WavHeader;
use crate::stream::pcm_source::PcmSource;
use crate::traits::container::ContainerFormatReader;
use crate::traits::stream_descriptor::StreamDescriptor;

/// Reads a WAVE stream: parses the header up front and decodes the data
/// chunk on demand.
#[derive(Debug)]
pub struct WavReader<R> {
    input: R,
    header: WavHeader,
}

impl<R: Read> WavReader<R> {
    /// Consume the 44-byte header from `input`.
    pub fn new(mut input: R) -> Result<Self, PipelineError> {
        let header = WavHeader::read_from(&mut input)?;
        log::debug!(
            "wav reader: format {}, {} channel(s), {} bits, {} Hz, {} frames, {:?} endian",
            header.format_code,
            header.channels,
            header.bits_per_sample,
            header.sample_rate,
            header.sample_count(),
            header.byte_order
        );
        Ok(Self { input, header })
    }

    pub fn header(&self) -> &WavHeader {
        &self.header
    }
}

impl<R: Read> ContainerFormatReader for WavReader<R> {
    type Source = PcmSource<R>;

    fn descriptor(&self) -> Result<Arc<dyn StreamDescriptor>, PipelineError> {
        if !self.header.is_linear_pcm() {
            return Err(PipelineError::InvalidAudioFormat(format!(
                "cannot describe stream with unsupported format code {}",
                self.header.format_code
            )));
        }
        Ok(self.header.descriptor().into_shared())
    }

    fn into_audio_source(self) -> Result<PcmSource<R>, PipelineError> {
        if !self.header.is_linear_pcm() {
            return Err(PipelineError::UnsupportedFormat(format!(
                "cannot create audio source for format code {}",
                self.header.format_code
            )));
        }
        let descriptor = self.descriptor()?;
        PcmSource::new(self.input, self.header.byte_order, descriptor)
    }
}
