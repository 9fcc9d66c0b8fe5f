//! JSON batch report for interoperability with other tools

use crate::config::Settings;
use crate::error::{Result, RetempoError};
use crate::types::{BatchReport, FileOutcome, StretchTarget};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON output structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportJson {
    /// Schema version for forward compatibility
    pub version: String,
    /// Batch metadata
    pub metadata: ReportMetadata,
    /// Per-file outcomes
    pub files: Vec<FileJson>,
}

/// Batch metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// retempo version that generated this file
    pub generator_version: String,
    /// Timestamp of the run
    pub generated_at: String,
    /// Folder that was processed
    pub folder: String,
    /// What the batch stretched towards
    pub target: TargetJson,
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// JSON representation of the stretch target
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetJson {
    Bpm { bpm: f64 },
    Factor { ratio: f64 },
}

/// JSON representation of one file's outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileJson {
    pub path: String,
    /// "done", "partial", "skipped", or "failed"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_bpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    /// Pipeline stage that failed (failed files only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Write the batch report to a JSON file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
/// This prevents a half-written report if the write is interrupted.
pub fn write_json(batch: &BatchReport, settings: &Settings, output_path: &Path) -> Result<()> {
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| {
        RetempoError::ConfigError(format!(
            "Cannot write report to '{}': {}",
            output_path.display(),
            e
        ))
    })?;

    let writer = BufWriter::new(file);

    let output = ReportJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ReportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            folder: settings.folder.to_string_lossy().to_string(),
            target: match settings.target {
                StretchTarget::Bpm(bpm) => TargetJson::Bpm { bpm },
                StretchTarget::Factor(ratio) => TargetJson::Factor { ratio },
            },
            total_files: batch.total_files,
            succeeded: batch.succeeded,
            failed: batch.failed,
            skipped: batch.skipped,
        },
        files: batch.files.iter().map(file_to_json).collect(),
    };

    serde_json::to_writer_pretty(writer, &output).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        RetempoError::ConfigError(format!(
            "Cannot write report to '{}': {}",
            output_path.display(),
            e
        ))
    })?;

    // Atomic rename: either succeeds completely or fails without modifying target
    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        RetempoError::ConfigError(format!(
            "Cannot finalize report '{}': {}",
            output_path.display(),
            e
        ))
    })?;

    info!("Wrote batch report to {}", output_path.display());

    Ok(())
}

fn file_to_json(report: &crate::types::FileReport) -> FileJson {
    let path = report.path.to_string_lossy().to_string();

    match &report.outcome {
        FileOutcome::Done {
            output,
            detected_bpm,
            factor,
        } => FileJson {
            path,
            status: "done".to_string(),
            output: Some(output.to_string_lossy().to_string()),
            detected_bpm: *detected_bpm,
            factor: Some(*factor),
            stage: None,
            error: None,
        },
        FileOutcome::Partial {
            output,
            detected_bpm,
            factor,
            warning,
        } => FileJson {
            path,
            status: "partial".to_string(),
            output: Some(output.to_string_lossy().to_string()),
            detected_bpm: *detected_bpm,
            factor: Some(*factor),
            stage: None,
            error: Some(warning.clone()),
        },
        FileOutcome::Skipped { output } => FileJson {
            path,
            status: "skipped".to_string(),
            output: Some(output.to_string_lossy().to_string()),
            detected_bpm: None,
            factor: None,
            stage: None,
            error: None,
        },
        FileOutcome::Failed { stage, reason } => FileJson {
            path,
            status: "failed".to_string(),
            output: None,
            detected_bpm: None,
            factor: None,
            stage: Some(stage.as_str().to_string()),
            error: Some(reason.clone()),
        },
    }
}
