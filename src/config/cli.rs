//! CLI argument parsing and configuration

use crate::error::{Result, RetempoError};
use crate::types::StretchTarget;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// retempo - Batch tempo adjustment for audio files
///
/// Detects the tempo of every audio file in a folder, time-stretches it to a
/// target BPM (or by an explicit ratio) without altering pitch, and writes a
/// new file next to the original with the source's tags copied over.
#[derive(Parser, Debug)]
#[command(name = "retempo")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("target").required(true).args(["bpm", "factor"])))]
pub struct Cli {
    /// Folder containing the audio files to process
    #[arg(short, long, value_name = "PATH")]
    pub folder: PathBuf,

    /// Target tempo in beats per minute
    #[arg(short, long, value_name = "BPM")]
    pub bpm: Option<f64>,

    /// Explicit tempo ratio to apply instead of a target BPM
    /// (2.0 doubles the tempo, 0.5 halves it)
    #[arg(long, value_name = "RATIO")]
    pub factor: Option<f64>,

    /// Directory for output files (defaults to the input folder)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Directory for intermediate WAV files (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Time-stretch executable to invoke
    #[arg(long, value_name = "BIN", default_value = "rubberband")]
    pub stretch_tool: PathBuf,

    /// Seconds to wait for the stretch tool before giving up on a file
    #[arg(long, value_name = "SECS", default_value = "600")]
    pub tool_timeout: u64,

    /// Write a JSON report of per-file outcomes to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Re-process files whose output already exists
    #[arg(long, default_value = "false")]
    pub force: bool,

    /// Show the files that would be processed without processing them
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Cli {
    /// Resolve the mutually exclusive --bpm/--factor pair
    pub fn target(&self) -> Result<StretchTarget> {
        match (self.bpm, self.factor) {
            (Some(bpm), None) => Ok(StretchTarget::Bpm(bpm)),
            (None, Some(ratio)) => Ok(StretchTarget::Factor(ratio)),
            _ => Err(RetempoError::ConfigError(
                "exactly one of --bpm or --factor must be given".to_string(),
            )),
        }
    }
}
