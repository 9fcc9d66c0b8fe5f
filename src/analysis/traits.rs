//! Analysis trait abstractions
//!
//! The detector trait is the seam for swappable tempo-estimation backends;
//! the pipeline only sees the trait.

use crate::error::Result;
use crate::types::{AudioBuffer, BpmEstimate};

/// Tempo detection backend
pub trait BpmDetector {
    /// Estimate the tempo of decoded audio
    fn detect(&self, buffer: &AudioBuffer) -> Result<BpmEstimate>;

    /// Get the name of this detector (for logging)
    fn name(&self) -> &'static str;
}
