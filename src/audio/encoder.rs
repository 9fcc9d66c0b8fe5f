//! Output-format conversion
//!
//! The stretch tool emits WAV. WAV outputs are copied straight to their
//! destination; compressed outputs (MP3, FLAC, AIFF) are produced by an
//! ffmpeg subprocess, the same conversion backend the rest of the audio
//! tool ecosystem shells out to.

use crate::error::{Result, RetempoError};
use crate::types::AudioFormat;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// External conversion tool
pub const FFMPEG: &str = "ffmpeg";

/// Check that ffmpeg can be spawned.
///
/// Only called when the batch contains files whose output format needs the
/// external encoder; WAV-only batches run without ffmpeg installed.
pub fn check_available() -> Result<()> {
    match Command::new(FFMPEG)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RetempoError::ToolNotFound {
            tool: FFMPEG.to_string(),
        }),
        Err(e) => Err(RetempoError::Io(e)),
    }
}

/// Convert the stretched WAV into the output file
pub fn encode(stretched_wav: &Path, output: &Path, format: AudioFormat) -> Result<()> {
    if format.requires_external_encoder() {
        encode_with_ffmpeg(stretched_wav, output, format)
    } else {
        // WAV target: the stretch tool already produced the right container
        std::fs::copy(stretched_wav, output).map_err(|e| {
            RetempoError::transcode_error(output, format!("Failed to write output: {}", e))
        })?;
        debug!("Copied stretched WAV to {}", output.display());
        Ok(())
    }
}

fn encode_with_ffmpeg(input: &Path, output: &Path, format: AudioFormat) -> Result<()> {
    let mut cmd = Command::new(FFMPEG);
    cmd.arg("-y").arg("-i").arg(input);
    if format == AudioFormat::Mp3 {
        cmd.args(["-codec:a", "libmp3lame", "-q:a", "2"]);
    }
    cmd.arg(output);
    cmd.stdin(Stdio::null());

    debug!("Encoding {} -> {}", input.display(), output.display());

    let result = cmd.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RetempoError::ToolNotFound {
                tool: FFMPEG.to_string(),
            }
        } else {
            RetempoError::transcode_error(output, format!("Failed to run ffmpeg: {}", e))
        }
    })?;

    if !result.status.success() {
        return Err(RetempoError::transcode_error(
            output,
            format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr_tail(&result.stderr)
            ),
        ));
    }

    info!("Encoded {}", output.display());
    Ok(())
}

/// Last few stderr lines, enough to show the actual ffmpeg complaint
fn stderr_tail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let tail = lines.len().saturating_sub(3);
    lines[tail..].join(" | ")
}
