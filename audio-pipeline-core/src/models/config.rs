use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::byte_order::ByteOrder;
use super::error::PipelineError;

/// Configuration of a transcoding pipeline.
///
/// Missing JSON fields take their default values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfiguration {
    /// Byte order of raw (headerless) PCM input and output (default: little).
    pub byte_order: ByteOrder,

    /// Resample to this rate in Hz, or keep the source rate when `None`.
    pub target_sample_rate: Option<u32>,

    /// Output bit depth. Valid values: 8, 16, 32, 64. `None` keeps the source depth.
    pub output_bits_per_sample: Option<u16>,

    /// Average all channels into one before resampling (default: false).
    pub mono_downmix: bool,

    /// Write a `.report.json` sidecar next to transcoded files (default: false).
    pub write_report: bool,
}

impl PipelineConfiguration {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.target_sample_rate == Some(0) {
            return Err(PipelineError::InvalidArgument("target sample rate must be positive".into()));
        }
        if let Some(bits) = self.output_bits_per_sample {
            if ![8, 16, 32, 64].contains(&bits) {
                return Err(PipelineError::InvalidArgument(format!("unsupported bit depth: {}", bits)));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PipelineError::InvalidArgument(format!("failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
