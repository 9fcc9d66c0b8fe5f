//! Stratum-DSP based tempo detection
//!
//! Uses the stratum-dsp library, a pure-Rust analysis stack built for DJ
//! tooling; no tempo estimation is done in this crate itself.

use crate::analysis::traits::BpmDetector;
use crate::error::{Result, RetempoError};
use crate::types::{AudioBuffer, BpmEstimate};
use stratum_dsp::{analyze_audio, AnalysisConfig};
use tracing::debug;

/// BPM detector using stratum-dsp
///
/// Uses autocorrelation and comb filterbank analysis for tempo detection.
pub struct StratumBpmDetector;

impl StratumBpmDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StratumBpmDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BpmDetector for StratumBpmDetector {
    fn detect(&self, buffer: &AudioBuffer) -> Result<BpmEstimate> {
        debug!(
            "Analyzing tempo with stratum-dsp ({} samples, {}Hz)",
            buffer.len(),
            buffer.sample_rate
        );

        let config = AnalysisConfig::default();

        // The caller owns the file path; it re-wraps detection errors with it.
        let result = analyze_audio(&buffer.samples, buffer.sample_rate, config).map_err(|e| {
            RetempoError::DetectionError {
                path: std::path::PathBuf::new(),
                reason: format!("Tempo analysis failed: {}", e),
            }
        })?;

        let estimate = BpmEstimate {
            value: result.bpm as f64,
            confidence: result.bpm_confidence as f64,
        };

        debug!(
            "Detected BPM: {:.2} (confidence: {:.2})",
            estimate.value, estimate.confidence
        );

        Ok(estimate)
    }

    fn name(&self) -> &'static str {
        "stratum-dsp"
    }
}
