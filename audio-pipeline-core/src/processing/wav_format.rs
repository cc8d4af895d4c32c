//! WAV header parsing and generation.
//!
//! Handles the canonical 44-byte RIFF header. `RIFF` files are little
//! endian, `RIFX` files big endian; the tag selects the byte order of both
//! the header fields and the sample data.

use std::io::{ErrorKind, Read};

use crate::models::byte_order::ByteOrder;
use crate::models::descriptor::PcmStreamDescriptor;
use crate::models::error::PipelineError;
use crate::processing::sample_codec::SampleWidth;
use crate::traits::stream_descriptor::StreamDescriptor;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Format code of uncompressed linear PCM.
pub const LINEAR_PCM_FORMAT_CODE: u16 = 1;

/// Offset of the RIFF chunk size (file size - 8).
pub const RIFF_SIZE_OFFSET: u64 = 4;

/// Offset of the data sub-chunk size.
pub const DATA_SIZE_OFFSET: u64 = 40;

const INVALID_WAVE_FILE: &str = "invalid WAVE file format";

/// Decoded fields of a 44-byte WAV header.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF" / "RIFX"
/// [4-7]    file size - 8
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  format code
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * block_align
/// [32-33]  block_align = channels * bits_per_sample / 8
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub byte_order: ByteOrder,
    pub riff_size: u32,
    pub format_code: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    /// Little-endian linear PCM header for `data_size` bytes of samples.
    pub fn linear_pcm(channels: u16, bits_per_sample: u16, sample_rate: u32, data_size: u32) -> Self {
        let block_align = channels.saturating_mul(bits_per_sample / 8);
        Self {
            byte_order: ByteOrder::Little,
            riff_size: riff_size_for(data_size),
            format_code: LINEAR_PCM_FORMAT_CODE,
            channels,
            sample_rate,
            byte_rate: sample_rate.saturating_mul(block_align as u32),
            block_align,
            bits_per_sample,
            data_size,
        }
    }

    /// Header for writing the stream described by `descriptor`.
    ///
    /// The data size is derived from the sample count, or left at 0 when the
    /// count is unknown. Fails with `InvalidArgument` for variable sample
    /// rates and `EncodingFailed` for unsupported widths or streams too large
    /// for a 32-bit RIFF size.
    pub fn from_descriptor(descriptor: &dyn StreamDescriptor) -> Result<Self, PipelineError> {
        if descriptor.has_variable_sample_rate() {
            return Err(PipelineError::InvalidArgument(
                "cannot write WAVE header for variable sample rate".into(),
            ));
        }
        let bits = descriptor.max_bits_per_sample(0);
        SampleWidth::from_bits(bits)
            .map_err(|_| PipelineError::EncodingFailed(format!("cannot write {bits}-bit samples to WAVE")))?;

        let data_size = match data_size_for(descriptor) {
            Some(size) => checked_data_size(size)?,
            None => 0,
        };

        Ok(Self::linear_pcm(
            descriptor.channel_count(),
            bits,
            descriptor.max_sample_rate(0),
            data_size,
        ))
    }

    /// Parse a header. The chunk tags must match and `block_align` must be
    /// non-zero; the format code is not checked here.
    pub fn parse(bytes: &[u8; WAV_HEADER_SIZE]) -> Result<Self, PipelineError> {
        let byte_order = match &bytes[0..4] {
            b"RIFF" => ByteOrder::Little,
            b"RIFX" => ByteOrder::Big,
            _ => return Err(PipelineError::InvalidAudioFormat(INVALID_WAVE_FILE.into())),
        };
        if &bytes[8..12] != b"WAVE" || &bytes[12..16] != b"fmt " || &bytes[36..40] != b"data" {
            return Err(PipelineError::InvalidAudioFormat(INVALID_WAVE_FILE.into()));
        }

        let header = Self {
            byte_order,
            riff_size: get_u32(bytes, 4, byte_order),
            format_code: get_u16(bytes, 20, byte_order),
            channels: get_u16(bytes, 22, byte_order),
            sample_rate: get_u32(bytes, 24, byte_order),
            byte_rate: get_u32(bytes, 28, byte_order),
            block_align: get_u16(bytes, 32, byte_order),
            bits_per_sample: get_u16(bytes, 34, byte_order),
            data_size: get_u32(bytes, 40, byte_order),
        };

        if header.block_align == 0 || header.channels == 0 {
            return Err(PipelineError::InvalidAudioFormat(format!(
                "{INVALID_WAVE_FILE}: {} channel(s) with block align {}",
                header.channels, header.block_align
            )));
        }
        Ok(header)
    }

    /// Read and parse the header from the front of `input`.
    pub fn read_from(input: &mut impl Read) -> Result<Self, PipelineError> {
        let mut bytes = [0u8; WAV_HEADER_SIZE];
        input.read_exact(&mut bytes).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => PipelineError::InvalidAudioFormat(format!("{INVALID_WAVE_FILE}: truncated header")),
            _ => PipelineError::Io(e),
        })?;
        Self::parse(&bytes)
    }

    /// Serialize in the header's own byte order.
    pub fn to_bytes(&self) -> [u8; WAV_HEADER_SIZE] {
        let order = self.byte_order;
        let mut header = [0u8; WAV_HEADER_SIZE];

        header[0..4].copy_from_slice(match order {
            ByteOrder::Little => b"RIFF",
            ByteOrder::Big => b"RIFX",
        });
        put_u32(&mut header, 4, self.riff_size, order);
        header[8..12].copy_from_slice(b"WAVE");

        header[12..16].copy_from_slice(b"fmt ");
        put_u32(&mut header, 16, 16, order);
        put_u16(&mut header, 20, self.format_code, order);
        put_u16(&mut header, 22, self.channels, order);
        put_u32(&mut header, 24, self.sample_rate, order);
        put_u32(&mut header, 28, self.byte_rate, order);
        put_u16(&mut header, 32, self.block_align, order);
        put_u16(&mut header, 34, self.bits_per_sample, order);

        header[36..40].copy_from_slice(b"data");
        put_u32(&mut header, 40, self.data_size, order);

        header
    }

    /// Frames in the data chunk.
    pub fn sample_count(&self) -> u64 {
        self.data_size as u64 / self.block_align as u64
    }

    pub fn is_linear_pcm(&self) -> bool {
        self.format_code == LINEAR_PCM_FORMAT_CODE
    }

    pub fn descriptor(&self) -> PcmStreamDescriptor {
        PcmStreamDescriptor::new(
            self.channels,
            self.bits_per_sample,
            self.sample_rate,
            Some(self.sample_count()),
        )
    }
}

/// Final WAV file size for the described stream, if its sample count is known.
pub fn calculate_file_size(descriptor: &dyn StreamDescriptor) -> Option<u64> {
    data_size_for(descriptor).map(|size| WAV_HEADER_SIZE as u64 + size)
}

/// RIFF chunk size for a data chunk of `data_size` bytes.
pub fn riff_size_for(data_size: u32) -> u32 {
    data_size.saturating_add((WAV_HEADER_SIZE - 8) as u32)
}

/// Narrow a data size to the 32-bit WAV field, leaving room for the header.
pub fn checked_data_size(size: u64) -> Result<u32, PipelineError> {
    u32::try_from(size)
        .ok()
        .filter(|size| size.checked_add((WAV_HEADER_SIZE - 8) as u32).is_some())
        .ok_or_else(|| PipelineError::EncodingFailed(format!("{size} bytes of audio exceed the WAVE size limit")))
}

fn data_size_for(descriptor: &dyn StreamDescriptor) -> Option<u64> {
    let frame_bytes = descriptor.channel_count() as u64 * (descriptor.max_bits_per_sample(0) / 8) as u64;
    descriptor.sample_count().map(|count| count.saturating_mul(frame_bytes))
}

fn get_u16(bytes: &[u8], offset: usize, order: ByteOrder) -> u16 {
    let raw = [bytes[offset], bytes[offset + 1]];
    match order {
        ByteOrder::Little => u16::from_le_bytes(raw),
        ByteOrder::Big => u16::from_be_bytes(raw),
    }
}

fn get_u32(bytes: &[u8], offset: usize, order: ByteOrder) -> u32 {
    let raw = [bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]];
    match order {
        ByteOrder::Little => u32::from_le_bytes(raw),
        ByteOrder::Big => u32::from_be_bytes(raw),
    }
}

fn put_u16(bytes: &mut [u8], offset: usize, value: u16, order: ByteOrder) {
    let raw = match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    };
    bytes[offset..offset + 2].copy_from_slice(&raw);
}

fn put_u32(bytes: &mut [u8], offset: usize, value: u32, order: ByteOrder) {
    let raw = match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    };
    bytes[offset..offset + 4].copy_from_slice(&raw);
}
