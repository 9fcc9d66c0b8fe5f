//! Unified error types for retempo
//!
//! Error strategy:
//! - Per-file errors (decode, detection, stretch, transcode): recoverable,
//!   skip the file and continue the batch
//! - Precondition/system errors (missing tool, bad folder): fatal, abort
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "MP3, WAV, FLAC, AIFF";

/// Top-level error type for retempo operations
#[derive(Debug, Error)]
pub enum RetempoError {
    // =========================================================================
    // Recoverable errors - skip file, continue batch
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("Tempo detection failed for '{path}': {reason}")]
    DetectionError { path: PathBuf, reason: String },

    #[error("Invalid BPM value {value}: tempo must be a positive finite number")]
    InvalidBpm { value: f64 },

    #[error("Format conversion failed for '{path}': {reason}")]
    TranscodeError { path: PathBuf, reason: String },

    #[error("Time-stretch failed for '{path}': {reason}")]
    StretchError { path: PathBuf, reason: String },

    /// Tag copying failed; the output file is kept without tags.
    #[error("Could not copy tags for '{path}': {reason}")]
    MetadataError { path: PathBuf, reason: String },

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("Required tool '{tool}' was not found on PATH\n  Tip: install it and make sure it is on your PATH\n    rubberband: https://breakfastquay.com/rubberband/ (package 'rubberband-cli')\n    ffmpeg:     https://ffmpeg.org/")]
    ToolNotFound { tool: String },

    #[error("Folder not found or not a directory: '{0}'\n  Tip: Check the path exists and is accessible")]
    FolderNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for retempo operations
pub type Result<T> = std::result::Result<T, RetempoError>;

impl RetempoError {
    /// Returns true if this error is recoverable (skip file, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RetempoError::DecodeError { .. }
                | RetempoError::UnsupportedFormat { .. }
                | RetempoError::DetectionError { .. }
                | RetempoError::InvalidBpm { .. }
                | RetempoError::TranscodeError { .. }
                | RetempoError::StretchError { .. }
                | RetempoError::MetadataError { .. }
        )
    }

    /// Returns true if this error leaves a usable output behind (tags only)
    pub fn is_warning(&self) -> bool {
        matches!(self, RetempoError::MetadataError { .. })
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RetempoError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a stretch error for a failed or timed-out subprocess
    pub fn stretch_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RetempoError::StretchError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a transcode error for a failed format conversion
    pub fn transcode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RetempoError::TranscodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a metadata error for a failed tag copy
    pub fn metadata_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RetempoError::MetadataError {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_file_errors_are_recoverable() {
        let err = RetempoError::decode_error("/x.mp3", "bad header");
        assert!(err.is_recoverable());
        let err = RetempoError::InvalidBpm { value: 0.0 };
        assert!(err.is_recoverable());
        let err = RetempoError::stretch_error("/x.mp3", "exit code 1");
        assert!(err.is_recoverable());
    }

    #[test]
    fn precondition_errors_are_fatal() {
        let err = RetempoError::ToolNotFound {
            tool: "rubberband".to_string(),
        };
        assert!(!err.is_recoverable());
        let err = RetempoError::FolderNotFound(PathBuf::from("/missing"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn only_metadata_errors_are_warnings() {
        assert!(RetempoError::metadata_error("/x.mp3", "corrupt tag").is_warning());
        assert!(!RetempoError::stretch_error("/x.mp3", "boom").is_warning());
    }
}
