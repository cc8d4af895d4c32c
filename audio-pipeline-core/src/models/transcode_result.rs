use serde::{Deserialize, Serialize};

/// Summary of a completed transcode.
///
/// Serializable for the JSON report sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodeResult {
    pub frames_written: u64,
    /// Bytes of encoded sample data, excluding any container header.
    pub data_bytes: u64,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub output_path: Option<String>,
    /// SHA-256 hex digest of the output file. Only set for file transcodes.
    pub checksum: Option<String>,
}

impl TranscodeResult {
    pub fn new(frames_written: u64, channels: u16, bits_per_sample: u16, sample_rate: u32) -> Self {
        let frame_bytes = channels as u64 * (bits_per_sample / 8) as u64;
        let duration_secs = if sample_rate == 0 {
            0.0
        } else {
            frames_written as f64 / sample_rate as f64
        };
        Self {
            frames_written,
            data_bytes: frames_written * frame_bytes,
            channels,
            bits_per_sample,
            sample_rate,
            duration_secs,
            output_path: None,
            checksum: None,
        }
    }
}
