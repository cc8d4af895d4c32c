use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::PipelineError;
use crate::models::transcode_result::TranscodeResult;

/// Path of the report sidecar: `{output_path}.report.json`.
pub fn report_path(output_path: &Path) -> PathBuf {
    let mut path = OsString::from(output_path.as_os_str());
    path.push(".report.json");
    PathBuf::from(path)
}

/// Write a transcode result as a JSON sidecar file next to the output.
pub fn write_report(result: &TranscodeResult, output_path: &Path) -> Result<PathBuf, PipelineError> {
    let path = report_path(output_path);
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| PipelineError::EncodingFailed(format!("failed to serialize report: {}", e)))?;
    fs::write(&path, json)?;
    log::debug!("report written to {}", path.display());
    Ok(path)
}

/// Read a transcode result from the JSON sidecar of `output_path`.
pub fn read_report(output_path: &Path) -> Result<TranscodeResult, PipelineError> {
    let json = fs::read_to_string(report_path(output_path))?;
    serde_json::from_str(&json).map_err(|e| PipelineError::DecodingFailed(format!("failed to parse report: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_name_appends_suffix() {
        assert_eq!(report_path(Path::new("/tmp/out.wav")), PathBuf::from("/tmp/out.wav.report.json"));
    }

    #[test]
    fn report_round_trips() {
        let output = std::env::temp_dir().join("audio_pipeline_test_report.wav");
        let mut result = TranscodeResult::new(100, 1, 16, 8000);
        result.output_path = Some(output.display().to_string());
        result.checksum = Some("ab".repeat(32));

        let path = write_report(&result, &output).unwrap();
        assert!(path.exists());
        assert_eq!(read_report(&output).unwrap(), result);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_report_is_io_error() {
        let output = std::env::temp_dir().join("audio_pipeline_test_no_report.wav");
        assert!(read_report(&output).unwrap_err().is_io());
    }
}
