//! Core data types for retempo
//!
//! These types represent the domain model and flow through the pipeline.

use std::path::PathBuf;

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats supported by retempo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Aiff,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "aiff" | "aif" => Some(AudioFormat::Aiff),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }

    /// True when producing this format requires the external encoder.
    /// WAV outputs come straight from the stretch tool.
    pub fn requires_external_encoder(&self) -> bool {
        !matches!(self, AudioFormat::Wav)
    }
}

// =============================================================================
// Stretch target
// =============================================================================

/// What the batch stretches towards: a tempo, or an explicit ratio.
///
/// Both resolve to the same internal stretch factor before the external
/// tool is invoked; only the output-name suffix differs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StretchTarget {
    /// Stretch every file to this tempo
    Bpm(f64),
    /// Stretch every file by this tempo ratio
    Factor(f64),
}

impl StretchTarget {
    /// Suffix appended to output file stems, e.g. "165BPM" or "x1.25"
    pub fn file_suffix(&self) -> String {
        match self {
            StretchTarget::Bpm(bpm) => format!("{}BPM", format_trimmed(*bpm)),
            StretchTarget::Factor(ratio) => format!("x{}", format_trimmed(*ratio)),
        }
    }
}

/// Format a number without trailing fractional zeros ("165", "99.5", "1.25")
fn format_trimmed(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// =============================================================================
// Audio buffer types
// =============================================================================

/// Decoded mono samples ready for tempo analysis
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Decoded audio at native fidelity, destined for the WAV intermediate.
///
/// Samples are interleaved and keep the source channel count and sample
/// rate: tempo processing must not resample or downmix the material.
#[derive(Debug, Clone)]
pub struct PcmAudio {
    /// Interleaved samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Channel count of the source
    pub channels: u16,
    /// Sample rate in Hz of the source
    pub sample_rate: u32,
}

impl PcmAudio {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// =============================================================================
// Analysis results
// =============================================================================

/// Tempo estimate for one file
#[derive(Debug, Clone, Copy)]
pub struct BpmEstimate {
    /// Detected BPM
    pub value: f64,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
}

// =============================================================================
// Per-file outcomes
// =============================================================================

/// Pipeline step during which a file can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    DetectBpm,
    ComputeFactor,
    Stretch,
    Encode,
    CopyTags,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Decode => "decode",
            Stage::DetectBpm => "detect-bpm",
            Stage::ComputeFactor => "compute-factor",
            Stage::Stretch => "stretch",
            Stage::Encode => "encode",
            Stage::CopyTags => "copy-tags",
        }
    }
}

/// Represents the outcome of processing a single file
#[derive(Debug)]
pub enum FileOutcome {
    /// Output produced with tags copied
    Done {
        output: PathBuf,
        /// Detected tempo (absent in explicit-factor mode)
        detected_bpm: Option<f64>,
        /// Tempo ratio applied
        factor: f64,
    },
    /// Output produced, but the tag copy failed
    Partial {
        output: PathBuf,
        detected_bpm: Option<f64>,
        factor: f64,
        warning: String,
    },
    /// Output already existed and --force was not given
    Skipped { output: PathBuf },
    /// No output produced
    Failed { stage: Stage, reason: String },
}

/// Outcome of one input file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Batch summary collected by the orchestrator
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Files whose output exists but carries no copied tags
    pub tag_warnings: usize,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn push(&mut self, report: FileReport) {
        self.total_files += 1;
        match &report.outcome {
            FileOutcome::Done { .. } => self.succeeded += 1,
            FileOutcome::Partial { .. } => {
                self.succeeded += 1;
                self.tag_warnings += 1;
            }
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.files.push(report);
    }

    /// Files that ended in the failed state, for the user-facing summary
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Failed { .. }))
    }
}
