//! Tempo analysis
//!
//! A trait seam for detection backends plus the stratum-dsp implementation
//! used in production and a fixed-value implementation for tests.

pub mod fixed;
pub mod stratum;
pub mod traits;

pub use fixed::FixedBpmDetector;
pub use stratum::StratumBpmDetector;
pub use traits::BpmDetector;
