//! Audio file I/O
//!
//! Decodes WAV files into mono 32-bit float buffers and, optionally, resamples
//! them to a fixed analysis rate. Writing is only used to build fixtures.
//!
//! Sample rate conversion uses linear interpolation.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::engine::buffer::AudioBuffer;
use crate::error::{GraphgenError, Result};

/// File extensions the decoder accepts (lowercase)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav"];

/// Check whether a path carries a supported audio extension
pub fn is_supported_audio(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Import an audio file as mono f32
///
/// Reads a WAV file, converts to 32-bit float, averages channels down to mono
/// and resamples to `target_rate` when one is given.
///
/// # Arguments
/// * `path` - Path to the WAV file to import
/// * `target_rate` - Analysis sample rate, or `None` to keep the file's rate
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the bit depth is not supported
/// * `EmptyAudio` - If the file decodes to zero samples
pub fn import_audio(path: &Path, target_rate: Option<u32>) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(GraphgenError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| GraphgenError::InvalidAudio {
        path: path.to_path_buf(),
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;

    if spec.sample_rate == 0 {
        return Err(GraphgenError::InvalidAudio {
            path: path.to_path_buf(),
            reason: "sample rate is 0".to_string(),
            source: None,
        });
    }

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)
        .map_err(|e| match e {
            GraphgenError::InvalidAudio { reason, source, .. } => GraphgenError::InvalidAudio {
                path: path.to_path_buf(),
                reason,
                source,
            },
            other => other,
        })?;

    let mut buffer = AudioBuffer::from_interleaved(&interleaved, channels, spec.sample_rate)?;

    if buffer.is_empty() {
        return Err(GraphgenError::EmptyAudio {
            path: path.to_path_buf(),
        });
    }

    if let Some(rate) = target_rate {
        if rate != buffer.sample_rate {
            let ratio = rate as f64 / buffer.sample_rate as f64;
            buffer = AudioBuffer::new(resample_linear(&buffer.samples, ratio), rate);
        }
    }

    debug!(
        "Decoded {}: {} samples @ {} Hz ({} source channels)",
        path.display(),
        buffer.len(),
        buffer.sample_rate,
        channels
    );

    Ok(buffer)
}

/// Write a mono buffer to a WAV file
///
/// # Arguments
/// * `buffer` - The audio buffer to write
/// * `path` - Path where the file will be written
/// * `bit_depth` - 16 (integer) or 32 (float)
pub fn export_wav(buffer: &AudioBuffer, path: &Path, bit_depth: u16) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: bit_depth,
        sample_format: if bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let to_io = |e: hound::Error| GraphgenError::FileWriteError {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    };

    let mut writer = WavWriter::create(path, spec).map_err(to_io)?;

    match bit_depth {
        16 => {
            for &sample in &buffer.samples {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(to_io)?;
            }
        }
        32 => {
            for &sample in &buffer.samples {
                writer.write_sample(sample).map_err(to_io)?;
            }
        }
        _ => {
            return Err(GraphgenError::UnsupportedFormat {
                format: format!("{}-bit export (only 16, 32 supported)", bit_depth),
            });
        }
    }

    writer.finalize().map_err(to_io)?;

    Ok(())
}

/// Generate a mono sine tone
///
/// # Arguments
/// * `frequency` - Frequency of the sine wave in Hz
/// * `duration_secs` - Duration of the tone in seconds
/// * `sample_rate` - Sample rate in Hz
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    let samples = (0..num_samples)
        .map(|i| 0.5 * (angular_freq * i as f32).sin())
        .collect();

    AudioBuffer::new(samples, sample_rate)
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let invalid = |bits: &str, e: hound::Error| GraphgenError::InvalidAudio {
        path: Default::default(),
        reason: format!("Failed to read {} samples: {}", bits, e),
        source: Some(Box::new(e)),
    };

    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("float", e)),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("8-bit", e)),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("16-bit", e)),
            24 => {
                // 24-bit stored as i32 in hound
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / 8388608.0))
                    .collect::<std::result::Result<Vec<f32>, _>>()
                    .map_err(|e| invalid("24-bit", e))
            }
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("32-bit int", e)),
            _ => Err(GraphgenError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

/// Linear interpolation resampling
///
/// `ratio` is target rate over source rate.
pub(crate) fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let source_len = samples.len();
    let target_len = ((source_len as f64) * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < source_len {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < source_len {
            samples[src_idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::DEFAULT_SAMPLE_RATE;
    use tempfile::tempdir;

    #[test]
    fn test_generate_test_tone() {
        let buffer = generate_test_tone(440.0, 1.0, 22050);

        assert_eq!(buffer.len(), 22050);
        assert_eq!(buffer.sample_rate, 22050);
        assert!(buffer.peak() <= 0.5 + 1e-6);
        assert!(buffer.peak() > 0.49);
    }

    #[test]
    fn test_resample_linear_upsample() {
        let samples = vec![0.0, 1.0, 0.0];
        let resampled = resample_linear(&samples, 2.0);

        assert_eq!(resampled.len(), 6);
        // At index 1 (src pos 0.5), should be 0.5
        assert!((resampled[1] - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_resample_linear_downsample() {
        let samples = vec![0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5];
        let resampled = resample_linear(&samples, 0.5);
        assert_eq!(resampled.len(), 4);
    }

    #[test]
    fn test_round_trip_16bit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let original = generate_test_tone(1000.0, 0.2, 22050);
        export_wav(&original, &path, 16).unwrap();
        let imported = import_audio(&path, None).unwrap();

        assert_eq!(imported.len(), original.len());
        assert_eq!(imported.sample_rate, 22050);
        for (orig, imp) in original.samples.iter().zip(imported.samples.iter()) {
            assert!((orig - imp).abs() < 0.001, "Sample mismatch: {} vs {}", orig, imp);
        }
    }

    #[test]
    fn test_import_resamples_to_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone44k.wav");

        let original = generate_test_tone(440.0, 0.5, 44100);
        export_wav(&original, &path, 32).unwrap();

        let imported = import_audio(&path, Some(22050)).unwrap();
        assert_eq!(imported.sample_rate, 22050);
        assert_eq!(imported.len(), 11025);
    }

    #[test]
    fn test_import_stereo_downmix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..800 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let imported = import_audio(&path, None).unwrap();
        assert_eq!(imported.len(), 800);
        assert!((imported.samples[0] - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_audio(Path::new("/nonexistent/path/audio.wav"), None);

        match result.unwrap_err() {
            GraphgenError::FileNotFound { path } => {
                assert!(path.to_string_lossy().contains("nonexistent"));
            }
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_import_garbage_is_invalid_audio() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        match import_audio(&path, None).unwrap_err() {
            GraphgenError::InvalidAudio { path: p, .. } => assert_eq!(p, path),
            other => panic!("Expected InvalidAudio error, got: {:?}", other),
        }
    }

    #[test]
    fn test_import_zero_sample_rate_is_invalid_audio() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zero_rate.wav");

        let data: [u8; 4] = [0x00, 0x10, 0x00, 0xf0];
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // channels
        bytes.extend_from_slice(&0u32.to_le_bytes()); // sample rate
        bytes.extend_from_slice(&0u32.to_le_bytes()); // byte rate
        bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&data);
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            import_audio(&path, Some(DEFAULT_SAMPLE_RATE)),
            Err(GraphgenError::InvalidAudio { .. })
        ));
        assert!(matches!(
            import_audio(&path, None),
            Err(GraphgenError::InvalidAudio { .. })
        ));
    }

    #[test]
    fn test_import_empty_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        export_wav(&AudioBuffer::new(Vec::new(), 22050), &path, 16).unwrap();

        assert!(matches!(
            import_audio(&path, None),
            Err(GraphgenError::EmptyAudio { .. })
        ));
    }

    #[test]
    fn test_supported_extension() {
        assert!(is_supported_audio(Path::new("a/b/clip1.wav")));
        assert!(is_supported_audio(Path::new("CLIP.WAV")));
        assert!(!is_supported_audio(Path::new("notes.txt")));
        assert!(!is_supported_audio(Path::new("noext")));
    }
}
