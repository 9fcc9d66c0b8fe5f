//! Runtime configuration settings

use crate::error::Result;
use crate::types::StretchTarget;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for one batch run.
///
/// Built once from the CLI and passed by reference into the pipeline;
/// there is no process-global configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Folder whose audio files are processed
    pub folder: PathBuf,
    /// Where output files are written
    pub output: PathBuf,
    /// Target tempo or explicit ratio
    pub target: StretchTarget,
    /// Parent directory for scratch files (None = system temp dir)
    pub temp_dir: Option<PathBuf>,
    /// Time-stretch executable
    pub stretch_tool: PathBuf,
    /// How long to wait for the stretch tool per file
    pub tool_timeout: Duration,
    /// Optional JSON report destination
    pub report: Option<PathBuf>,
    /// Re-process files whose output already exists
    pub force: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// List planned work without processing
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Result<Self> {
        let target = cli.target()?;

        Ok(Self {
            folder: cli.folder.clone(),
            output: cli.output.clone().unwrap_or_else(|| cli.folder.clone()),
            target,
            temp_dir: cli.temp_dir.clone(),
            stretch_tool: cli.stretch_tool.clone(),
            tool_timeout: Duration::from_secs(cli.tool_timeout),
            report: cli.report.clone(),
            force: cli.force,
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
            output: PathBuf::from("."),
            target: StretchTarget::Bpm(120.0),
            temp_dir: None,
            stretch_tool: PathBuf::from("rubberband"),
            tool_timeout: Duration::from_secs(600),
            report: None,
            force: false,
            show_progress: true,
            dry_run: false,
        }
    }
}
