//! Audio Buffer
//!
//! Mono 32-bit float sample buffer shared by the decode, augmentation and
//! feature stages. Multi-channel input is downmixed on import.

use crate::error::{GraphgenError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default decode sample rate (22.05kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

// ============================================================================
// Helper Functions
// ============================================================================

/// Calculate the RMS (Root Mean Square) level of a sample slice
///
/// Returns 0.0 for empty input.
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Calculate the peak (maximum absolute value) of a sample slice
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Decoded mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data in the range [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from mono samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a mono buffer from interleaved data, averaging the channels
    ///
    /// # Arguments
    /// * `interleaved` - Interleaved sample data (L, R, L, R, ... for stereo)
    /// * `channels` - Number of interleaved channels
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    /// Error if the data length is not a multiple of the channel count
    pub fn from_interleaved(interleaved: &[f32], channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(GraphgenError::UnsupportedFormat {
                format: "0-channel audio".to_string(),
            });
        }

        if interleaved.len() % channels != 0 {
            return Err(GraphgenError::UnsupportedFormat {
                format: format!(
                    "interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    channels
                ),
            });
        }

        if channels == 1 {
            return Ok(Self::new(interleaved.to_vec(), sample_rate));
        }

        let scale = 1.0 / channels as f32;
        let samples = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale)
            .collect();

        Ok(Self::new(samples, sample_rate))
    }

    /// Get the number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer is empty (no samples)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Peak level (linear)
    pub fn peak(&self) -> f32 {
        calculate_peak(&self.samples)
    }
}
