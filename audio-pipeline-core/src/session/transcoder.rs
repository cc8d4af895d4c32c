use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::models::config::PipelineConfiguration;
use crate::models::error::PipelineError;
use crate::models::transcode_result::TranscodeResult;
use crate::processing::bit_depth::BitDepthConverter;
use crate::processing::mono_downmix::MonoDownmix;
use crate::processing::resampler::Resampler;
use crate::storage::report::write_report;
use crate::storage::wav_reader::WavReader;
use crate::storage::wav_writer::WavWriter;
use crate::stream::pcm_source::PcmSource;
use crate::stream::pcm_writer::PcmStreamWriter;
use crate::traits::audio_source::AudioSource;
use crate::traits::container::{ContainerFormatReader, ContainerFormatWriter};
use crate::traits::stream_descriptor::StreamDescriptor;
use crate::traits::stream_writer::AudioStreamWriter;

/// Runs a source through the transform chain described by a
/// [`PipelineConfiguration`] and encodes the result.
///
/// Stages are applied in a fixed order: mono downmix, resampling, then the
/// bit depth change. Stages that would not change the stream are skipped.
#[derive(Debug, Clone)]
pub struct Transcoder {
    config: PipelineConfiguration,
}

impl Transcoder {
    pub fn new(config: PipelineConfiguration) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfiguration {
        &self.config
    }

    /// Wrap `source` in the configured transforms.
    pub fn build_chain<'a>(&self, source: Box<dyn AudioSource + 'a>) -> Result<Box<dyn AudioSource + 'a>, PipelineError> {
        let descriptor = source.descriptor();
        let mut chain = source;

        if self.config.mono_downmix && descriptor.channel_count() > 1 {
            chain = Box::new(MonoDownmix::new(chain));
        }

        if let Some(rate) = self.config.target_sample_rate {
            if descriptor.has_variable_sample_rate() || descriptor.max_sample_rate(0) != rate {
                chain = Box::new(Resampler::new(chain, rate)?);
            }
        }

        if let Some(bits) = self.config.output_bits_per_sample {
            if descriptor.has_variable_bits_per_sample() || descriptor.max_bits_per_sample(0) != bits {
                chain = Box::new(BitDepthConverter::new(chain, bits)?);
            }
        }

        Ok(chain)
    }

    /// Transcode a WAVE stream into another WAVE stream.
    pub fn transcode_wav<R: Read, W: Write + Seek>(&self, input: R, output: W) -> Result<TranscodeResult, PipelineError> {
        let source = WavReader::new(input)?.into_audio_source()?;
        let mut chain = self.build_chain(Box::new(source))?;

        let mut writer = WavWriter::new(output);
        let frames = pull_then_close(chain.as_mut(), |source| writer.write(source))?;
        Ok(summarize(frames, chain.descriptor().as_ref()))
    }

    /// Transcode headerless PCM in the configured byte order.
    ///
    /// `descriptor` describes the input stream; the output uses the same
    /// byte order.
    pub fn transcode_pcm<R: Read, W: Write>(
        &self,
        input: R,
        descriptor: Arc<dyn StreamDescriptor>,
        mut output: W,
    ) -> Result<TranscodeResult, PipelineError> {
        let source = PcmSource::new(input, self.config.byte_order, descriptor)?;
        let mut chain = self.build_chain(Box::new(source))?;

        let writer = PcmStreamWriter::new(self.config.byte_order);
        let frames = pull_then_close(chain.as_mut(), |source| writer.write(source, &mut output))?;
        output.flush()?;
        Ok(summarize(frames, chain.descriptor().as_ref()))
    }

    /// Transcode a WAVE file, checksum the output and optionally write the
    /// report sidecar.
    pub fn transcode_file(&self, input_path: &Path, output_path: &Path) -> Result<TranscodeResult, PipelineError> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let input = BufReader::new(File::open(input_path)?);
        let output = BufWriter::new(File::create(output_path)?);
        let mut result = self.transcode_wav(input, output)?;

        result.output_path = Some(output_path.display().to_string());
        result.checksum = Some(sha256_file(output_path)?);

        if self.config.write_report {
            write_report(&result, output_path)?;
        }

        log::info!(
            "transcoded {} -> {}: {} frames, {} channel(s), {} bits, {} Hz ({:.2}s)",
            input_path.display(),
            output_path.display(),
            result.frames_written,
            result.channels,
            result.bits_per_sample,
            result.sample_rate,
            result.duration_secs
        );
        Ok(result)
    }
}

/// Drain `source` through `pull`, then close the whole chain. A pull error
/// takes precedence over a close error.
fn pull_then_close(
    source: &mut dyn AudioSource,
    pull: impl FnOnce(&mut dyn AudioSource) -> Result<u64, PipelineError>,
) -> Result<u64, PipelineError> {
    let pulled = pull(&mut *source);
    let closed = source.close();
    let frames = pulled?;
    closed?;
    Ok(frames)
}

fn summarize(frames: u64, descriptor: &dyn StreamDescriptor) -> TranscodeResult {
    TranscodeResult::new(
        frames,
        descriptor.channel_count(),
        descriptor.max_bits_per_sample(0),
        descriptor.max_sample_rate(0),
    )
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, PipelineError> {
    let data = fs::read(path)?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
