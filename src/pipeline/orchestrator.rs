//! Pipeline orchestration
//!
//! Drives the per-file pipeline sequentially over one folder: decode,
//! detect tempo, compute the stretch factor, render the WAV intermediate,
//! invoke the stretch tool, encode, copy tags. Per-file errors are
//! reported and skipped; fatal preconditions abort before any file is
//! touched.

use crate::analysis::{BpmDetector, StratumBpmDetector};
use crate::audio::{self, encoder, wav};
use crate::config::Settings;
use crate::discovery::{self, DiscoveredFile};
use crate::error::{Result, RetempoError};
use crate::metadata;
use crate::report;
use crate::stretch::{RubberbandStretcher, StretchFactor};
use crate::types::{BatchReport, FileOutcome, FileReport, Stage, StretchTarget};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Minimum audio duration in seconds required for reliable tempo detection
const MIN_AUDIO_DURATION_SECS: f64 = 3.0;

/// Run the full batch with the production tempo detector
pub fn run(settings: &Settings) -> Result<BatchReport> {
    let detector = StratumBpmDetector::new();
    run_with_detector(settings, &detector)
}

/// Run the full batch with a caller-supplied tempo detector
pub fn run_with_detector(
    settings: &Settings,
    detector: &dyn BpmDetector,
) -> Result<BatchReport> {
    let batch_start = Instant::now();

    // The stretch tool is a hard precondition: check it before touching
    // any file so a missing install aborts with nothing half-done.
    let stretcher = RubberbandStretcher::new(&settings.stretch_tool, settings.tool_timeout);
    stretcher.check_available()?;

    info!("Scanning {}", settings.folder.display());
    let files = discovery::scan(&settings.folder)?;

    if files.is_empty() {
        return Ok(BatchReport::default());
    }

    // ffmpeg is only required when some output needs the external encoder
    if files
        .iter()
        .any(|f| f.format.requires_external_encoder())
    {
        encoder::check_available()?;
    }

    if settings.dry_run {
        return run_dry_run(&files, settings);
    }

    std::fs::create_dir_all(&settings.output)?;

    // One scratch root per batch, one nested directory per file. Dropping
    // a TempDir removes it, so cleanup holds on success, error, and unwind.
    let scratch = match &settings.temp_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            tempfile::Builder::new().prefix("retempo-").tempdir_in(dir)?
        }
        None => tempfile::Builder::new().prefix("retempo-").tempdir()?,
    };

    info!(
        "Processing {} files (detector: {})",
        files.len(),
        detector.name()
    );

    let progress_bar = if settings.show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut batch = BatchReport::default();

    for file in &files {
        if let Some(pb) = &progress_bar {
            pb.set_message(
                file.path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string(),
            );
        }

        let outcome = process_file(file, settings, detector, &stretcher, scratch.path())?;

        match &outcome {
            FileOutcome::Done { output, .. } => {
                info!("{} -> {}", file.path.display(), output.display());
            }
            FileOutcome::Partial { output, warning, .. } => {
                warn!(
                    "{} -> {} (tags not copied: {})",
                    file.path.display(),
                    output.display(),
                    warning
                );
            }
            FileOutcome::Skipped { output } => {
                info!(
                    "Skipping {} ({} already exists, use --force to overwrite)",
                    file.path.display(),
                    output.display()
                );
            }
            FileOutcome::Failed { stage, reason } => {
                warn!(
                    "Skipping {} (failed during {}): {}",
                    file.path.display(),
                    stage.as_str(),
                    reason
                );
            }
        }

        batch.push(FileReport {
            path: file.path.clone(),
            outcome,
        });

        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Batch complete");
    }

    if let Some(report_path) = &settings.report {
        report::write_json(&batch, settings, report_path)?;
    }

    info!(
        "Batch finished in {:.2}s",
        batch_start.elapsed().as_secs_f64()
    );

    Ok(batch)
}

/// Dry run mode - show planned outputs without processing anything
fn run_dry_run(files: &[DiscoveredFile], settings: &Settings) -> Result<BatchReport> {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    for file in files {
        let output = output_path(file, settings);
        println!(
            "  {}  ->  {}",
            file.path.display(),
            output
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
        );
    }

    println!();
    println!("Would process {} files into {}", files.len(), settings.output.display());
    println!();

    Ok(BatchReport {
        total_files: files.len(),
        skipped: files.len(),
        ..Default::default()
    })
}

/// Result of the per-file pipeline body
struct ProcessedFile {
    detected_bpm: Option<f64>,
    factor: f64,
    tag_warning: Option<String>,
}

/// Process one file, converting recoverable errors into a Failed outcome.
/// Fatal errors propagate and abort the batch.
fn process_file(
    file: &DiscoveredFile,
    settings: &Settings,
    detector: &dyn BpmDetector,
    stretcher: &RubberbandStretcher,
    scratch_root: &Path,
) -> Result<FileOutcome> {
    let output = output_path(file, settings);

    if output.exists() && !settings.force {
        return Ok(FileOutcome::Skipped { output });
    }

    match process_file_inner(file, settings, detector, stretcher, scratch_root, &output) {
        Ok(processed) => Ok(match processed.tag_warning {
            None => FileOutcome::Done {
                output,
                detected_bpm: processed.detected_bpm,
                factor: processed.factor,
            },
            Some(warning) => FileOutcome::Partial {
                output,
                detected_bpm: processed.detected_bpm,
                factor: processed.factor,
                warning,
            },
        }),
        Err(e) if e.is_recoverable() => {
            // The invariant: a failed file leaves no partial output behind
            if output.exists() {
                if let Err(rm) = std::fs::remove_file(&output) {
                    warn!(
                        "Could not remove partial output {}: {}",
                        output.display(),
                        rm
                    );
                }
            }
            Ok(FileOutcome::Failed {
                stage: failure_stage(&e),
                reason: e.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}

/// The per-file pipeline body; any error aborts this file only
fn process_file_inner(
    file: &DiscoveredFile,
    settings: &Settings,
    detector: &dyn BpmDetector,
    stretcher: &RubberbandStretcher,
    scratch_root: &Path,
    output: &Path,
) -> Result<ProcessedFile> {
    debug!("Processing {}", file.path.display());

    // Scratch directory owned by this file; dropped (and deleted) on every
    // way out of this function.
    let scratch = tempfile::Builder::new()
        .prefix("file-")
        .tempdir_in(scratch_root)
        .map_err(|e| {
            RetempoError::transcode_error(
                &file.path,
                format!("Failed to create scratch directory: {}", e),
            )
        })?;

    // Resolve the stretch factor, detecting tempo only when targeting a BPM
    let (detected_bpm, factor) = match settings.target {
        StretchTarget::Bpm(target) => {
            let buffer = audio::decode_for_analysis(&file.path)?;

            if buffer.duration < MIN_AUDIO_DURATION_SECS {
                return Err(RetempoError::DetectionError {
                    path: file.path.clone(),
                    reason: format!(
                        "Audio too short ({:.1}s). Minimum {:.0}s required for reliable tempo detection.",
                        buffer.duration, MIN_AUDIO_DURATION_SECS
                    ),
                });
            }

            let estimate = detector.detect(&buffer).map_err(|e| match e {
                // Detection errors gain the file context here
                RetempoError::DetectionError { reason, .. } => RetempoError::DetectionError {
                    path: file.path.clone(),
                    reason,
                },
                other => other,
            })?;

            info!(
                "{}: detected {:.1} BPM (confidence {:.2})",
                file.path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy(),
                estimate.value,
                estimate.confidence
            );

            let factor = StretchFactor::from_target_bpm(estimate.value, target)?;
            (Some(estimate.value), factor)
        }
        StretchTarget::Factor(ratio) => (None, StretchFactor::from_ratio(ratio)?),
    };

    debug!("{}: applying tempo ratio {}", file.path.display(), factor);

    // Render the lossless intermediate the stretch tool requires
    let pcm = audio::decode_native(&file.path)?;
    let temp_in = scratch.path().join("input.wav");
    let temp_out = scratch.path().join("stretched.wav");
    wav::write_pcm_wav(&temp_in, &pcm)?;

    stretcher.stretch(&temp_in, &temp_out, factor)?;

    encoder::encode(&temp_out, output, file.format)?;

    // Tags go on last so they overwrite anything the encoder wrote
    let tag_warning = match metadata::copy_tags(&file.path, output) {
        Ok(()) => None,
        Err(e) => Some(e.to_string()),
    };

    Ok(ProcessedFile {
        detected_bpm,
        factor: factor.ratio(),
        tag_warning,
    })
}

/// Output path for one input: `<stem>_<suffix>.<ext>` in the output folder
fn output_path(file: &DiscoveredFile, settings: &Settings) -> PathBuf {
    let stem = file
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = file
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("wav");

    settings.output.join(format!(
        "{}_{}.{}",
        stem,
        settings.target.file_suffix(),
        ext
    ))
}

/// Which pipeline step a recoverable error belongs to
fn failure_stage(err: &RetempoError) -> Stage {
    match err {
        RetempoError::DecodeError { .. } | RetempoError::UnsupportedFormat { .. } => Stage::Decode,
        RetempoError::DetectionError { .. } => Stage::DetectBpm,
        RetempoError::InvalidBpm { .. } => Stage::ComputeFactor,
        RetempoError::StretchError { .. } => Stage::Stretch,
        RetempoError::TranscodeError { .. } => Stage::Encode,
        RetempoError::MetadataError { .. } => Stage::CopyTags,
        _ => Stage::Decode,
    }
}
