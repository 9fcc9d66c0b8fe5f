//! Batch report export

pub mod json;

pub use json::write_json;
