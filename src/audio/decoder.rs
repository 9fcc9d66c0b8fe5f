//! Audio decoding using symphonia
//!
//! Two decode paths share one packet loop:
//! - `decode_for_analysis`: mono f32 at the analysis sample rate, resampled
//!   with rubato (anti-aliased) for tempo detection
//! - `decode_native`: interleaved f32 at the source rate and channel count,
//!   used to write the lossless WAV intermediate for the stretch tool

use crate::error::{Result, RetempoError};
use crate::types::{AudioBuffer, PcmAudio};
use rubato::{FftFixedInOut, Resampler};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Target sample rate for tempo analysis (22050 Hz)
///
/// Sufficient for BPM detection while halving the computation compared
/// to 44.1kHz material.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22050;

/// Maximum file size we'll attempt to decode (2GB)
/// Prevents OOM on extremely large files
const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Raw decode result shared by both public paths
struct DecodedStream {
    /// Interleaved samples
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

/// Decode an audio file to a mono buffer at the analysis sample rate
pub fn decode_for_analysis(path: &Path) -> Result<AudioBuffer> {
    let stream = decode_stream(path)?;

    let mono = to_mono(&stream.samples, stream.channels);
    let samples = if stream.sample_rate != ANALYSIS_SAMPLE_RATE {
        resample(&mono, stream.sample_rate, ANALYSIS_SAMPLE_RATE)
    } else {
        mono
    };

    debug!(
        "Decoded {} analysis samples ({:.2}s)",
        samples.len(),
        samples.len() as f64 / ANALYSIS_SAMPLE_RATE as f64
    );

    Ok(AudioBuffer::new(samples, ANALYSIS_SAMPLE_RATE))
}

/// Decode an audio file at native fidelity for the WAV intermediate.
///
/// Keeps the source sample rate and channel count: the stretch tool is
/// responsible for all time-domain processing, and resampling here would
/// degrade the output.
pub fn decode_native(path: &Path) -> Result<PcmAudio> {
    let stream = decode_stream(path)?;

    debug!(
        "Decoded {} frames at {}Hz, {} channels",
        stream.samples.len() / stream.channels.max(1),
        stream.sample_rate,
        stream.channels
    );

    Ok(PcmAudio::new(
        stream.samples,
        stream.channels as u16,
        stream.sample_rate,
    ))
}

/// Probe, select the first audio track, and decode every packet to f32
fn decode_stream(path: &Path) -> Result<DecodedStream> {
    // Check file size before attempting to decode
    let metadata = std::fs::metadata(path).map_err(|e| RetempoError::DecodeError {
        path: path.to_path_buf(),
        reason: format!("Failed to read file metadata: {}", e),
    })?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(RetempoError::DecodeError {
            path: path.to_path_buf(),
            reason: format!(
                "File too large ({:.1} GB). Maximum supported size is 2 GB.",
                metadata.len() as f64 / (1024.0 * 1024.0 * 1024.0)
            ),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| RetempoError::DecodeError {
        path: path.to_path_buf(),
        reason: format!("Failed to open file: {}", e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Provide a hint based on file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| RetempoError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("Failed to probe format: {}", e),
        })?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| RetempoError::DecodeError {
            path: path.to_path_buf(),
            reason: "No audio tracks found".to_string(),
        })?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params.sample_rate.unwrap_or(44100);
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(2);

    debug!(
        "Decoding: {} @ {}Hz, {} channels",
        path.display(),
        sample_rate,
        channels
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| RetempoError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("Failed to create decoder: {}", e),
        })?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break; // End of stream
            }
            Err(e) => {
                return Err(RetempoError::DecodeError {
                    path: path.to_path_buf(),
                    reason: format!("Failed to read packet: {}", e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                // Skip corrupted frames
                trace!("Skipping corrupted frame: {}", e);
                continue;
            }
            Err(e) => {
                return Err(RetempoError::DecodeError {
                    path: path.to_path_buf(),
                    reason: format!("Decode error: {}", e),
                });
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend(sample_buf.samples());
    }

    if samples.is_empty() {
        return Err(RetempoError::DecodeError {
            path: path.to_path_buf(),
            reason: "No audio samples decoded".to_string(),
        });
    }

    Ok(DecodedStream {
        samples,
        sample_rate,
        channels,
    })
}

/// Convert interleaved multi-channel audio to mono
fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// High-quality audio resampling using rubato
///
/// FFT-based resampling with a proper anti-aliasing filter, so the analysis
/// buffer stays faithful enough for tempo estimation. Falls back to linear
/// interpolation if rubato cannot be initialized for the rate pair.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    const CHUNK_SIZE: usize = 1024;

    let mut resampler = match FftFixedInOut::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        1, // mono channel
    ) {
        Ok(r) => r,
        Err(e) => {
            debug!("Rubato initialization failed ({}), using fallback", e);
            return resample_linear_fallback(samples, from_rate, to_rate);
        }
    };

    let input_frames_per_chunk = resampler.input_frames_next();
    let output_frames_per_chunk = resampler.output_frames_next();

    let ratio = to_rate as f64 / from_rate as f64;
    let estimated_output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(estimated_output_len);

    let mut pos = 0;
    while pos < samples.len() {
        let end = (pos + input_frames_per_chunk).min(samples.len());
        let mut chunk = samples[pos..end].to_vec();

        // Pad last chunk if needed
        if chunk.len() < input_frames_per_chunk {
            chunk.resize(input_frames_per_chunk, 0.0);
        }

        let input_channels = vec![chunk];

        match resampler.process(&input_channels, None) {
            Ok(resampled) => {
                if let Some(channel) = resampled.first() {
                    // Only take valid samples (not padding)
                    let valid_samples = if pos + input_frames_per_chunk > samples.len() {
                        let input_valid = samples.len() - pos;
                        let output_valid = (input_valid as f64 * ratio).ceil() as usize;
                        output_valid.min(output_frames_per_chunk)
                    } else {
                        output_frames_per_chunk
                    };
                    // Guard against floating-point rounding causing out-of-bounds
                    let safe_samples = valid_samples.min(channel.len());
                    output.extend_from_slice(&channel[..safe_samples]);
                }
            }
            Err(e) => {
                debug!("Rubato processing error ({}), using fallback for remaining", e);
                let remaining = resample_linear_fallback(&samples[pos..], from_rate, to_rate);
                output.extend(remaining);
                break;
            }
        }

        pos += input_frames_per_chunk;
    }

    output
}

/// Fallback linear interpolation resampler
fn resample_linear_fallback(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos as usize;
        let frac = src_pos - src_idx as f64;

        let sample = if src_idx + 1 < samples.len() {
            samples[src_idx] * (1.0 - frac as f32) + samples[src_idx + 1] * frac as f32
        } else {
            samples[src_idx.min(samples.len() - 1)]
        };

        output.push(sample);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_stereo_wav(path: &Path, seconds: f32, sample_rate: u32) {
        use std::f32::consts::PI;

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (seconds * sample_rate as f32) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let sample = ((2.0 * PI * 220.0 * t).sin() * 0.5 * 32767.0) as i16;
            writer.write_sample(sample).unwrap();
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn to_mono_averages_stereo() {
        let stereo = vec![0.5, 0.3, 0.8, 0.2, 1.0, 0.0];
        let mono = to_mono(&stereo, 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.4).abs() < 0.001);
        assert!((mono[1] - 0.5).abs() < 0.001);
        assert!((mono[2] - 0.5).abs() < 0.001);
    }

    #[test]
    fn to_mono_passes_through_mono() {
        let mono = vec![0.5, 0.8, 1.0];
        assert_eq!(to_mono(&mono, 1), mono);
    }

    #[test]
    fn resample_identity() {
        let samples = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        assert_eq!(resample(&samples, 44100, 44100), samples);
    }

    #[test]
    fn resample_halves_length() {
        let samples: Vec<f32> = (0..1000).map(|i| i as f32 / 1000.0).collect();
        let result = resample(&samples, 44100, 22050);
        assert!((result.len() as f64 - 500.0).abs() < 2.0);
    }

    #[test]
    fn resample_fallback_halves_length() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let result = resample_linear_fallback(&samples, 44100, 22050);
        assert!((result.len() as f64 - 50.0).abs() < 2.0);
    }

    #[test]
    fn decode_native_keeps_rate_and_channels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        write_stereo_wav(&path, 1.0, 44100);

        let pcm = decode_native(&path).unwrap();
        assert_eq!(pcm.channels, 2);
        assert_eq!(pcm.sample_rate, 44100);
        assert!((pcm.duration() - 1.0).abs() < 0.05);
    }

    #[test]
    fn decode_for_analysis_is_mono_at_analysis_rate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        write_stereo_wav(&path, 1.0, 44100);

        let buffer = decode_for_analysis(&path).unwrap();
        assert_eq!(buffer.sample_rate, ANALYSIS_SAMPLE_RATE);
        assert!((buffer.duration - 1.0).abs() < 0.05);
    }

    #[test]
    fn decode_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"this is not audio").unwrap();

        let err = decode_native(&path).unwrap_err();
        assert!(err.is_recoverable());
    }
}
