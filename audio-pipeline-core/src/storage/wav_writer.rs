use std::io::{Seek, SeekFrom, Write};

use crate::models::byte_order::ByteOrder;
use crate::models::error::PipelineError;
use crate::processing::wav_format::{self, WavHeader};
use crate::stream::pcm_writer::PcmStreamWriter;
use crate::traits::audio_source::AudioSource;
use crate::traits::container::ContainerFormatWriter;
use crate::traits::stream_writer::AudioStreamWriter;

/// Writes an audio source as a little-endian linear PCM WAVE stream.
///
/// ## File Format
///
/// ```text
/// [44-byte WAV header]
/// [interleaved PCM data...]
/// ```
///
/// The header sizes are derived from the descriptor's sample count. When the
/// actual byte count differs (unknown count, or a source that ended early),
/// the writer seeks back and patches the RIFF and data sizes.
#[derive(Debug)]
pub struct WavWriter<W> {
    output: W,
    data_bytes: u64,
}

impl<W: Write + Seek> WavWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output, data_bytes: 0 }
    }

    /// Bytes of sample data written by the last [`write`](ContainerFormatWriter::write).
    pub fn data_bytes(&self) -> u64 {
        self.data_bytes
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn patch_sizes(&mut self, start: u64, data_size: u32) -> Result<(), PipelineError> {
        let end = self.output.stream_position()?;

        self.output.seek(SeekFrom::Start(start + wav_format::RIFF_SIZE_OFFSET))?;
        self.output.write_all(&wav_format::riff_size_for(data_size).to_le_bytes())?;

        self.output.seek(SeekFrom::Start(start + wav_format::DATA_SIZE_OFFSET))?;
        self.output.write_all(&data_size.to_le_bytes())?;

        self.output.seek(SeekFrom::Start(end))?;
        Ok(())
    }
}

impl<W: Write + Seek> ContainerFormatWriter for WavWriter<W> {
    fn write(&mut self, source: &mut dyn AudioSource) -> Result<u64, PipelineError> {
        let descriptor = source.descriptor();
        let header = WavHeader::from_descriptor(descriptor.as_ref())?;

        let start = self.output.stream_position()?;
        self.output.write_all(&header.to_bytes())?;

        let frames = PcmStreamWriter::new(ByteOrder::Little).write(source, &mut self.output)?;
        self.data_bytes = frames * header.block_align as u64;

        if self.data_bytes != header.data_size as u64 {
            let data_size = wav_format::checked_data_size(self.data_bytes)?;
            log::debug!(
                "wav writer: patching data size {} -> {} bytes",
                header.data_size,
                data_size
            );
            self.patch_sizes(start, data_size)?;
        }

        self.output.flush()?;
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::io::{BufWriter, Cursor};
    use std::path::PathBuf;

    use super::*;
    use crate::models::descriptor::{PcmStreamDescriptor, ProxyDescriptor};
    use crate::processing::array_source::ArraySource;
    use crate::storage::wav_reader::WavReader;
    use crate::traits::container::ContainerFormatReader;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("audio_pipeline_test_{}", name))
    }

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
    }

    #[test]
    fn write_stereo_wav() {
        let descriptor = PcmStreamDescriptor::new(2, 16, 48000, Some(4));
        let mut source = ArraySource::new(descriptor.into_shared(), vec![0.0; 8]).unwrap();

        let mut writer = WavWriter::new(Cursor::new(Vec::new()));
        assert_eq!(writer.write(&mut source).unwrap(), 4);
        assert_eq!(writer.data_bytes(), 16);

        let bytes = writer.into_inner().into_inner();
        assert_eq!(bytes.len(), 44 + 16);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(read_u32(&bytes, 4), 36 + 16);
        assert_eq!(read_u32(&bytes, 40), 16);
    }

    #[test]
    fn unknown_sample_count_is_patched() {
        let base = PcmStreamDescriptor::new(1, 8, 8000, Some(5)).into_shared();
        let descriptor = ProxyDescriptor::new(base).with_sample_count(None).into_shared();
        let mut source = ArraySource::new(descriptor, vec![0.5; 5]).unwrap();

        let mut writer = WavWriter::new(Cursor::new(Vec::new()));
        writer.write(&mut source).unwrap();
        let bytes = writer.into_inner().into_inner();

        assert_eq!(bytes.len(), 44 + 5);
        assert_eq!(read_u32(&bytes, 4), 36 + 5);
        assert_eq!(read_u32(&bytes, 40), 5);
    }

    #[test]
    fn writes_after_existing_content() {
        let descriptor = PcmStreamDescriptor::new(1, 16, 8000, None);
        let mut source = ArraySource::new(descriptor.into_shared(), vec![0.25, -0.25]).unwrap();

        let mut cursor = Cursor::new(vec![0xEE; 10]);
        cursor.set_position(10);
        let mut writer = WavWriter::new(cursor);
        writer.write(&mut source).unwrap();
        let bytes = writer.into_inner().into_inner();

        assert_eq!(&bytes[..10], &[0xEE; 10]);
        assert_eq!(&bytes[10..14], b"RIFF");
        assert_eq!(read_u32(&bytes, 10 + 40), 4);
    }

    #[test]
    fn written_file_reads_back() {
        let path = temp_file_path("round_trip.wav");
        let data = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
        let descriptor = PcmStreamDescriptor::new(2, 32, 44100, Some(3));
        let mut source = ArraySource::new(descriptor.into_shared(), data.clone()).unwrap();

        let mut writer = WavWriter::new(BufWriter::new(File::create(&path).unwrap()));
        writer.write(&mut source).unwrap();
        drop(writer);

        let expected_size = wav_format::calculate_file_size(source.descriptor().as_ref()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), expected_size);

        let reader = WavReader::new(File::open(&path).unwrap()).unwrap();
        let mut decoded = reader.into_audio_source().unwrap();
        let mut samples = Vec::new();
        while decoded.advance().unwrap() {
            samples.push(decoded.sample(0));
            samples.push(decoded.sample(1));
        }
        for (expected, actual) in data.iter().zip(&samples) {
            approx::assert_abs_diff_eq!(*expected, *actual, epsilon = 1e-9);
        }
        assert_eq!(samples.len(), data.len());

        fs::remove_file(&path).ok();
    }
}
