//! Stretch factor calculation
//!
//! Pure derivation of the tempo ratio applied to each file. The public
//! value is always tempo-relative (2.0 = twice as fast); the reciprocal
//! duration ratio the external tool expects lives behind `time_ratio`.

use crate::error::{Result, RetempoError};

/// Validated tempo ratio, immutable once computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StretchFactor(f64);

impl StretchFactor {
    /// Derive the ratio that takes `detected` BPM to `target` BPM
    pub fn from_target_bpm(detected: f64, target: f64) -> Result<Self> {
        if !detected.is_finite() || detected <= 0.0 {
            return Err(RetempoError::InvalidBpm { value: detected });
        }
        if !target.is_finite() || target <= 0.0 {
            return Err(RetempoError::InvalidBpm { value: target });
        }
        Ok(Self(target / detected))
    }

    /// Accept an explicit tempo ratio
    pub fn from_ratio(ratio: f64) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(RetempoError::InvalidBpm { value: ratio });
        }
        Ok(Self(ratio))
    }

    /// Tempo multiplier (target / detected)
    pub fn ratio(&self) -> f64 {
        self.0
    }

    /// Duration multiplier handed to the stretch tool.
    ///
    /// Speeding a track up shortens it, so the tool receives the
    /// reciprocal of the tempo ratio.
    pub fn time_ratio(&self) -> f64 {
        1.0 / self.0
    }
}

impl std::fmt::Display for StretchFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}
