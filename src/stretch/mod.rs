//! Stretch factor derivation and external tool invocation

pub mod factor;
pub mod rubberband;

pub use factor::StretchFactor;
pub use rubberband::RubberbandStretcher;
