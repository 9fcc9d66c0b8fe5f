//! Integration tests for the retempo pipeline
//!
//! These tests drive the full batch pipeline over generated WAV fixtures.
//! A stub shell script stands in for the rubberband binary so the tests
//! exercise orchestration, scratch-file lifecycle, and reporting without
//! requiring the real tool.

use retempo::analysis::FixedBpmDetector;
use retempo::config::Settings;
use retempo::error::RetempoError;
use retempo::pipeline;
use retempo::types::{FileOutcome, Stage, StretchTarget};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Generate a sine wave WAV file for testing
///
/// Creates a mono 16-bit WAV file at the specified path.
fn generate_sine_wav(path: &Path, frequency_hz: f32, duration_secs: f32, sample_rate: u32) {
    use std::f32::consts::PI;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");

    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let amplitude = 0.5f32; // 50% amplitude to avoid clipping

    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        let sample = (2.0 * PI * frequency_hz * t).sin() * amplitude;
        let sample_i16 = (sample * 32767.0) as i16;
        writer.write_sample(sample_i16).expect("Failed to write sample");
    }

    writer.finalize().expect("Failed to finalize WAV");
}

/// Generate a click track WAV file for tempo testing
///
/// Creates impulses at regular intervals matching the specified BPM.
fn generate_click_track(path: &Path, bpm: f32, duration_secs: f32, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");

    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let samples_per_beat = (60.0 / bpm * sample_rate as f32) as usize;

    // Impulse duration: ~5ms (short click)
    let impulse_samples = (0.005 * sample_rate as f32) as usize;

    for i in 0..num_samples {
        let position_in_beat = i % samples_per_beat;

        let sample = if position_in_beat < impulse_samples {
            let decay = (-5.0 * position_in_beat as f32 / impulse_samples as f32).exp();
            0.8 * decay
        } else {
            0.0
        };

        let sample_i16 = (sample * 32767.0) as i16;
        writer
            .write_sample(sample_i16)
            .expect("Failed to write sample");
    }

    writer.finalize().expect("Failed to finalize WAV");
}

/// Write an executable shell script standing in for the stretch tool.
///
/// The real invocation is `tool -t <ratio> --pitch 0 --crisp 5 <in> <out>`,
/// so the input is `$7` and the output `$8`.
#[cfg(unix)]
fn write_stub_tool(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("stub-stretch");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write stub tool");
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Stub that behaves like a well-mannered stretch tool: copies input to output
#[cfg(unix)]
fn passthrough_tool(dir: &Path) -> PathBuf {
    write_stub_tool(dir, "cp \"$7\" \"$8\"")
}

/// Create test settings with progress bars disabled
fn create_test_settings(folder: &Path, output: &Path, tool: &Path, scratch: &Path) -> Settings {
    Settings {
        folder: folder.to_path_buf(),
        output: output.to_path_buf(),
        target: StretchTarget::Bpm(165.0),
        temp_dir: Some(scratch.to_path_buf()),
        stretch_tool: tool.to_path_buf(),
        tool_timeout: Duration::from_secs(30),
        report: None,
        force: false,
        show_progress: false, // Disable progress bars in tests
        dry_run: false,
    }
}

fn assert_dir_empty(dir: &Path) {
    let leftovers: Vec<_> = fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assert!(
        leftovers.is_empty(),
        "Expected {} to be empty, found {:?}",
        dir.display(),
        leftovers
            .iter()
            .map(|e| e.file_name())
            .collect::<Vec<_>>()
    );
}

// =============================================================================
// Happy path
// =============================================================================

#[cfg(unix)]
#[test]
fn batch_produces_named_outputs() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    generate_click_track(&input_dir.path().join("Song.wav"), 120.0, 5.0, 44100);
    generate_click_track(&input_dir.path().join("Other.wav"), 120.0, 5.0, 44100);

    let settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &passthrough_tool(tool_dir.path()),
        scratch_dir.path(),
    );

    let detector = FixedBpmDetector::new(120.0);
    let report = pipeline::run_with_detector(&settings, &detector).expect("batch should run");

    assert_eq!(report.total_files, 2);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 0);

    assert!(output_dir.path().join("Song_165BPM.wav").is_file());
    assert!(output_dir.path().join("Other_165BPM.wav").is_file());
}

#[cfg(unix)]
#[test]
fn factor_mode_skips_detection_and_names_by_ratio() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    generate_sine_wav(&input_dir.path().join("Loop.wav"), 440.0, 2.0, 44100);

    let mut settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &passthrough_tool(tool_dir.path()),
        scratch_dir.path(),
    );
    settings.target = StretchTarget::Factor(1.25);

    // Factor mode never consults a detector, so the production entry point
    // works even on material too short for analysis.
    let report = pipeline::run(&settings).expect("batch should run");

    assert_eq!(report.succeeded, 1);
    assert!(output_dir.path().join("Loop_x1.25.wav").is_file());
}

#[cfg(unix)]
#[test]
fn output_tags_match_source_tags() {
    use lofty::{Accessor, Probe, Tag, TagExt, TagType, TaggedFileExt};

    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    let source = input_dir.path().join("Tagged.wav");
    generate_click_track(&source, 120.0, 5.0, 44100);

    let mut tag = Tag::new(TagType::Id3v2);
    tag.set_title("Original Title".to_string());
    tag.set_artist("Original Artist".to_string());
    tag.save_to_path(&source).expect("Failed to tag fixture");

    let settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &passthrough_tool(tool_dir.path()),
        scratch_dir.path(),
    );

    let detector = FixedBpmDetector::new(120.0);
    let report = pipeline::run_with_detector(&settings, &detector).expect("batch should run");
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.tag_warnings, 0);

    let output = output_dir.path().join("Tagged_165BPM.wav");
    let tagged = Probe::open(&output).unwrap().read().unwrap();
    let out_tag = tagged
        .primary_tag()
        .or_else(|| tagged.first_tag())
        .expect("output should carry tags");
    assert_eq!(out_tag.title().as_deref(), Some("Original Title"));
    assert_eq!(out_tag.artist().as_deref(), Some("Original Artist"));
}

// =============================================================================
// Error handling
// =============================================================================

#[cfg(unix)]
#[test]
fn corrupt_file_is_reported_but_batch_continues() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    generate_click_track(&input_dir.path().join("good_a.wav"), 120.0, 5.0, 44100);
    generate_click_track(&input_dir.path().join("good_b.wav"), 120.0, 5.0, 44100);
    fs::write(input_dir.path().join("broken.wav"), b"This is not a WAV file!").unwrap();

    let settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &passthrough_tool(tool_dir.path()),
        scratch_dir.path(),
    );

    let detector = FixedBpmDetector::new(120.0);
    let report = pipeline::run_with_detector(&settings, &detector).expect("batch should run");

    assert_eq!(report.total_files, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);

    // The two valid files produced outputs; the corrupt one did not
    assert!(output_dir.path().join("good_a_165BPM.wav").is_file());
    assert!(output_dir.path().join("good_b_165BPM.wav").is_file());
    assert!(!output_dir.path().join("broken_165BPM.wav").exists());

    let failed: Vec<_> = report.failures().collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].path.ends_with("broken.wav"));
    assert!(matches!(
        failed[0].outcome,
        FileOutcome::Failed {
            stage: Stage::Decode,
            ..
        }
    ));
}

#[test]
fn missing_tool_aborts_before_any_file_is_processed() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();

    generate_click_track(&input_dir.path().join("track.wav"), 120.0, 5.0, 44100);

    let settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        Path::new("/no/such/stretch-tool"),
        scratch_dir.path(),
    );

    let detector = FixedBpmDetector::new(120.0);
    let err = pipeline::run_with_detector(&settings, &detector).unwrap_err();
    assert!(matches!(err, RetempoError::ToolNotFound { .. }));

    // Nothing was created: no outputs, no scratch files
    assert_dir_empty(output_dir.path());
    assert_dir_empty(scratch_dir.path());
}

#[cfg(unix)]
#[test]
fn failing_tool_leaves_no_partial_outputs() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    generate_click_track(&input_dir.path().join("track.wav"), 120.0, 5.0, 44100);

    let settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &write_stub_tool(tool_dir.path(), "echo 'synthetic failure' >&2; exit 1"),
        scratch_dir.path(),
    );

    let detector = FixedBpmDetector::new(120.0);
    let report = pipeline::run_with_detector(&settings, &detector).expect("batch should run");

    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 0);
    assert!(matches!(
        report.files[0].outcome,
        FileOutcome::Failed {
            stage: Stage::Stretch,
            ..
        }
    ));

    assert_dir_empty(output_dir.path());
}

// =============================================================================
// Scratch-file lifecycle
// =============================================================================

#[cfg(unix)]
#[test]
fn scratch_directory_is_empty_after_success_and_failure() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    // One file succeeds, one is undecodable
    generate_click_track(&input_dir.path().join("fine.wav"), 120.0, 5.0, 44100);
    fs::write(input_dir.path().join("junk.wav"), b"not audio").unwrap();

    let settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &passthrough_tool(tool_dir.path()),
        scratch_dir.path(),
    );

    let detector = FixedBpmDetector::new(120.0);
    let report = pipeline::run_with_detector(&settings, &detector).expect("batch should run");
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);

    // No intermediate WAVs or tool logs survive the run
    assert_dir_empty(scratch_dir.path());
}

// =============================================================================
// Re-runs and skipping
// =============================================================================

#[cfg(unix)]
#[test]
fn existing_outputs_are_skipped_unless_forced() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    generate_click_track(&input_dir.path().join("track.wav"), 120.0, 5.0, 44100);

    let mut settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &passthrough_tool(tool_dir.path()),
        scratch_dir.path(),
    );

    let detector = FixedBpmDetector::new(120.0);

    let first = pipeline::run_with_detector(&settings, &detector).unwrap();
    assert_eq!(first.succeeded, 1);

    let second = pipeline::run_with_detector(&settings, &detector).unwrap();
    assert_eq!(second.succeeded, 0);
    assert_eq!(second.skipped, 1);

    settings.force = true;
    let third = pipeline::run_with_detector(&settings, &detector).unwrap();
    assert_eq!(third.succeeded, 1);
    assert_eq!(third.skipped, 0);
}

#[cfg(unix)]
#[test]
fn empty_folder_produces_empty_report() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    let settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &passthrough_tool(tool_dir.path()),
        scratch_dir.path(),
    );

    let detector = FixedBpmDetector::new(120.0);
    let report = pipeline::run_with_detector(&settings, &detector).unwrap();

    assert_eq!(report.total_files, 0);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped, 0);
}

#[cfg(unix)]
#[test]
fn dry_run_touches_nothing() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    generate_click_track(&input_dir.path().join("track.wav"), 120.0, 5.0, 44100);

    let mut settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &passthrough_tool(tool_dir.path()),
        scratch_dir.path(),
    );
    settings.dry_run = true;

    let detector = FixedBpmDetector::new(120.0);
    let report = pipeline::run_with_detector(&settings, &detector).unwrap();

    assert_eq!(report.total_files, 1);
    assert_eq!(report.skipped, 1);
    assert_dir_empty(output_dir.path());
    assert_dir_empty(scratch_dir.path());
}

// =============================================================================
// Report output
// =============================================================================

#[cfg(unix)]
#[test]
fn json_report_reflects_batch_outcomes() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let tool_dir = TempDir::new().unwrap();

    generate_click_track(&input_dir.path().join("good.wav"), 120.0, 5.0, 44100);
    fs::write(input_dir.path().join("bad.wav"), b"garbage").unwrap();

    let report_path = output_dir.path().join("retempo-report.json");
    let mut settings = create_test_settings(
        input_dir.path(),
        output_dir.path(),
        &passthrough_tool(tool_dir.path()),
        scratch_dir.path(),
    );
    settings.report = Some(report_path.clone());

    let detector = FixedBpmDetector::new(120.0);
    pipeline::run_with_detector(&settings, &detector).expect("batch should run");

    let text = fs::read_to_string(&report_path).expect("report should exist");
    let json: serde_json::Value = serde_json::from_str(&text).expect("report should be valid JSON");

    assert_eq!(json["metadata"]["total_files"], 2);
    assert_eq!(json["metadata"]["succeeded"], 1);
    assert_eq!(json["metadata"]["failed"], 1);

    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    let statuses: Vec<_> = files
        .iter()
        .map(|f| f["status"].as_str().unwrap().to_string())
        .collect();
    assert!(statuses.contains(&"done".to_string()));
    assert!(statuses.contains(&"failed".to_string()));
}

// =============================================================================
// Tempo detection on synthetic material
// =============================================================================

#[test]
fn stratum_detects_click_track_in_plausible_range() {
    use retempo::analysis::{BpmDetector, StratumBpmDetector};
    use retempo::audio::decode_for_analysis;

    let input_dir = TempDir::new().unwrap();
    let path = input_dir.path().join("click_120.wav");
    generate_click_track(&path, 120.0, 10.0, 44100);

    let buffer = decode_for_analysis(&path).expect("fixture should decode");
    let estimate = StratumBpmDetector::new()
        .detect(&buffer)
        .expect("detection should succeed on rhythmic material");

    // Tempo detectors commonly land on octave equivalents; a pure range
    // check keeps this independent of the backend's octave policy.
    assert!(
        (40.0..=260.0).contains(&estimate.value),
        "detected {} BPM, expected a plausible tempo",
        estimate.value
    );
}
