//! Fixed-value tempo detector
//!
//! Returns a preconfigured BPM regardless of input. Used by tests that
//! exercise the pipeline without depending on real tempo estimation.

use crate::analysis::traits::BpmDetector;
use crate::error::Result;
use crate::types::{AudioBuffer, BpmEstimate};

/// Detector that reports the same tempo for every file
pub struct FixedBpmDetector {
    bpm: f64,
}

impl FixedBpmDetector {
    pub fn new(bpm: f64) -> Self {
        Self { bpm }
    }
}

impl BpmDetector for FixedBpmDetector {
    fn detect(&self, _buffer: &AudioBuffer) -> Result<BpmEstimate> {
        Ok(BpmEstimate {
            value: self.bpm,
            confidence: 1.0,
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
