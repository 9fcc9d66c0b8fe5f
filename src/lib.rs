//! retempo - Batch Tempo Adjustment for Audio Files
//!
//! A command-line utility that time-stretches every audio file in a folder
//! to a target BPM (or by an explicit ratio) without altering pitch,
//! preserving each file's tags on the output.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: non-recursive folder scanning
//! - `audio`: decoding (symphonia), WAV intermediates (hound), and
//!   output encoding (ffmpeg)
//! - `analysis`: tempo detection behind a swappable trait (stratum-dsp)
//! - `stretch`: stretch-factor derivation and the rubberband subprocess
//! - `metadata`: tag copying onto outputs (lofty)
//! - `pipeline`: sequential batch orchestration
//! - `report`: JSON batch report
//!
//! # Example
//!
//! ```no_run
//! use retempo::{config::Settings, pipeline, types::StretchTarget};
//!
//! let settings = Settings {
//!     folder: "/music".into(),
//!     output: "/music".into(),
//!     target: StretchTarget::Bpm(165.0),
//!     ..Default::default()
//! };
//! let report = pipeline::run(&settings).expect("batch failed");
//! println!("{} files processed", report.succeeded);
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod discovery;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod report;
pub mod stretch;
pub mod types;

// Re-export key types at crate root
pub use error::{Result, RetempoError};
pub use stretch::StretchFactor;
pub use types::{BatchReport, FileOutcome, StretchTarget};
