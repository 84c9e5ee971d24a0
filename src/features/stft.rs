//! Short-time Fourier transform
//!
//! Centered, zero-padded STFT with a periodic Hann window, plus the matching
//! overlap-add inverse used by the time-stretch augmentation.

use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Default FFT size
pub const N_FFT: usize = 2048;

/// Default hop length
pub const HOP_LENGTH: usize = 512;

/// Forward/inverse STFT with fixed framing
pub struct Stft {
    n_fft: usize,
    hop_length: usize,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl fmt::Debug for Stft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stft")
            .field("n_fft", &self.n_fft)
            .field("hop_length", &self.hop_length)
            .finish()
    }
}

impl Default for Stft {
    fn default() -> Self {
        Self::new(N_FFT, HOP_LENGTH)
    }
}

impl Stft {
    /// Create an STFT with the given FFT size and hop length
    pub fn new(n_fft: usize, hop_length: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            n_fft,
            hop_length,
            window: hann_window(n_fft),
            forward: planner.plan_fft_forward(n_fft),
            inverse: planner.plan_fft_inverse(n_fft),
        }
    }

    /// FFT size
    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    /// Hop length
    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Number of non-negative frequency bins
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Centre frequency of each bin in Hz
    pub fn bin_frequencies(&self, sample_rate: u32) -> Vec<f32> {
        (0..self.n_bins())
            .map(|k| k as f32 * sample_rate as f32 / self.n_fft as f32)
            .collect()
    }

    /// Number of frames produced for a signal of `len` samples
    pub fn num_frames(&self, len: usize) -> usize {
        // Centering pads n_fft/2 on both sides, so there is always one frame
        1 + len / self.hop_length
    }

    /// Forward transform
    ///
    /// Returns `frames × bins` complex coefficients.
    pub fn forward(&self, samples: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let pad = self.n_fft / 2;
        let num_frames = self.num_frames(samples.len());
        let mut frames = Vec::with_capacity(num_frames);
        let mut scratch = vec![Complex::new(0.0, 0.0); self.n_fft];

        for t in 0..num_frames {
            let start = (t * self.hop_length) as isize - pad as isize;
            for (j, slot) in scratch.iter_mut().enumerate() {
                let idx = start + j as isize;
                let sample = if idx >= 0 && (idx as usize) < samples.len() {
                    samples[idx as usize]
                } else {
                    0.0
                };
                *slot = Complex::new(sample * self.window[j], 0.0);
            }

            self.forward.process(&mut scratch);
            frames.push(scratch[..self.n_bins()].to_vec());
        }

        frames
    }

    /// Inverse transform by windowed overlap-add
    ///
    /// # Arguments
    /// * `frames` - `frames × bins` coefficients, as produced by `forward`
    /// * `length` - Number of output samples
    pub fn inverse(&self, frames: &[Vec<Complex<f32>>], length: usize) -> Vec<f32> {
        let pad = self.n_fft / 2;
        let total = self.n_fft + self.hop_length * frames.len().saturating_sub(1);
        let mut output = vec![0.0_f32; total];
        let mut window_sum = vec![0.0_f32; total];
        let mut scratch = vec![Complex::new(0.0, 0.0); self.n_fft];
        let scale = 1.0 / self.n_fft as f32;

        for (t, frame) in frames.iter().enumerate() {
            for (k, slot) in scratch.iter_mut().enumerate() {
                *slot = if k < self.n_bins() {
                    frame.get(k).copied().unwrap_or_default()
                } else {
                    // Hermitian symmetry for a real signal
                    frame.get(self.n_fft - k).copied().unwrap_or_default().conj()
                };
            }

            self.inverse.process(&mut scratch);

            let offset = t * self.hop_length;
            for (j, value) in scratch.iter().enumerate() {
                let w = self.window[j];
                output[offset + j] += value.re * scale * w;
                window_sum[offset + j] += w * w;
            }
        }

        for (sample, &norm) in output.iter_mut().zip(window_sum.iter()) {
            if norm > 1e-8 {
                *sample /= norm;
            }
        }

        let mut result: Vec<f32> = output.into_iter().skip(pad).take(length).collect();
        result.resize(length, 0.0);
        result
    }
}

/// Periodic Hann window
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}
