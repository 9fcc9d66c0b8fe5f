//! WAV intermediate writer
//!
//! The external stretch tool only accepts uncompressed input, so every
//! source file is rendered to a 16-bit PCM WAV in the scratch directory
//! before invocation.

use crate::error::{Result, RetempoError};
use crate::types::PcmAudio;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;
use tracing::debug;

/// Write decoded audio as a 16-bit PCM WAV at its native rate and layout
pub fn write_pcm_wav(path: &Path, audio: &PcmAudio) -> Result<()> {
    let spec = WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| {
        RetempoError::transcode_error(path, format!("Failed to create WAV: {}", e))
    })?;

    for &sample in &audio.samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer
            .write_sample((clamped * 32767.0) as i16)
            .map_err(|e| {
                RetempoError::transcode_error(path, format!("Failed to write WAV sample: {}", e))
            })?;
    }

    writer.finalize().map_err(|e| {
        RetempoError::transcode_error(path, format!("Failed to finalize WAV: {}", e))
    })?;

    debug!(
        "Wrote intermediate WAV {} ({} frames @ {}Hz)",
        path.display(),
        audio.frames(),
        audio.sample_rate
    );

    Ok(())
}
