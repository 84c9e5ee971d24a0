//! Feature Computation
//!
//! Turns a sample buffer into the 2-D array that gets rendered and,
//! optionally, persisted. Every feature type produces a `FeatureMatrix` whose
//! rows are the vertical axis of the rendered image (frequency, band, pitch
//! class or coefficient) and whose columns are time.

pub mod chroma;
pub mod mel;
pub mod stft;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GraphgenError, Result};
use rustfft::num_complex::Complex;
use stft::Stft;

/// Floor applied before taking logarithms
const AMIN: f32 = 1e-10;

/// Dynamic range kept by the dB conversions
const TOP_DB: f32 = 80.0;

// ============================================================================
// Feature Type
// ============================================================================

/// Kind of graph to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FeatureType {
    /// Log-power mel spectrogram
    #[default]
    MelSpectrogram,
    /// Log-magnitude linear-frequency spectrogram
    Spectrogram,
    /// Mel-frequency cepstral coefficients
    Mfcc,
    /// Pitch-class energy
    Chromagram,
    /// Raw amplitude over time
    Waveform,
}

impl FeatureType {
    /// Every supported type
    pub const ALL: [FeatureType; 5] = [
        FeatureType::MelSpectrogram,
        FeatureType::Spectrogram,
        FeatureType::Mfcc,
        FeatureType::Chromagram,
        FeatureType::Waveform,
    ];

    /// Name used on the command line and in output paths
    pub fn name(&self) -> &'static str {
        match self {
            FeatureType::MelSpectrogram => "melspectrogram",
            FeatureType::Spectrogram => "spectrogram",
            FeatureType::Mfcc => "mfcc",
            FeatureType::Chromagram => "chromagram",
            FeatureType::Waveform => "waveform",
        }
    }

    /// Whether the feature is rendered as a time-frequency heatmap
    pub fn is_time_frequency(&self) -> bool {
        !matches!(self, FeatureType::Waveform)
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureType {
    type Err = GraphgenError;

    fn from_str(s: &str) -> Result<Self> {
        FeatureType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| GraphgenError::UnsupportedFeatureType {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for FeatureType {
    type Error = GraphgenError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FeatureType> for String {
    fn from(value: FeatureType) -> Self {
        value.name().to_string()
    }
}

// ============================================================================
// Feature Matrix
// ============================================================================

/// Row-major 2-D feature array plus the sample rate it came from
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
    /// Sample rate of the source audio (0 when unknown, e.g. read back from disk)
    pub sample_rate: u32,
}

impl FeatureMatrix {
    /// Create a zero-filled matrix
    pub fn zeros(rows: usize, cols: usize, sample_rate: u32) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
            sample_rate,
        }
    }

    /// Wrap row-major data
    ///
    /// # Errors
    /// `EmptyFeature` if `data.len() != rows * cols`
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(GraphgenError::EmptyFeature { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            data,
            sample_rate,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major values
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// One row (e.g. one frequency band over time)
    pub fn row(&self, r: usize) -> &[f32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f32 {
        self.data[r * self.cols + c]
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, value: f32) {
        self.data[r * self.cols + c] = value;
    }

    /// Smallest and largest finite value, `(0.0, 0.0)` when there are none
    pub fn min_max(&self) -> (f32, f32) {
        let mut finite = self.data.iter().copied().filter(|v| v.is_finite());
        match finite.next() {
            Some(first) => finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
            None => (0.0, 0.0),
        }
    }
}

// ============================================================================
// Computation
// ============================================================================

/// Compute the feature data for a buffer
///
/// # Arguments
/// * `samples` - Mono samples (possibly augmented)
/// * `sample_rate` - Sample rate in Hz
/// * `feature_type` - Which representation to compute
pub fn compute_features(samples: &[f32], sample_rate: u32, feature_type: FeatureType) -> FeatureMatrix {
    let stft = Stft::default();
    match feature_type {
        FeatureType::MelSpectrogram => mel::melspectrogram(samples, sample_rate, &stft),
        FeatureType::Mfcc => mel::mfcc(samples, sample_rate, &stft),
        FeatureType::Chromagram => chroma::chromagram(samples, sample_rate, &stft),
        FeatureType::Spectrogram => spectrogram(samples, sample_rate, &stft),
        FeatureType::Waveform => FeatureMatrix {
            rows: 1,
            cols: samples.len(),
            data: samples.to_vec(),
            sample_rate,
        },
    }
}

/// Log-magnitude spectrogram, `bins × frames`, in dB
pub fn spectrogram(samples: &[f32], sample_rate: u32, stft: &Stft) -> FeatureMatrix {
    let frames = stft.forward(samples);
    let mut spec = FeatureMatrix::zeros(stft.n_bins(), frames.len(), sample_rate);
    for (t, frame) in frames.iter().enumerate() {
        for (k, c) in frame.iter().enumerate() {
            spec.set(k, t, c.norm());
        }
    }
    amplitude_to_db(&mut spec);
    spec
}

/// |X|^2 for every STFT coefficient
pub(crate) fn power_spectrum(frames: &[Vec<Complex<f32>>]) -> Vec<Vec<f32>> {
    frames
        .iter()
        .map(|frame| frame.iter().map(|c| c.norm_sqr()).collect())
        .collect()
}

/// Convert power to dB relative to the matrix maximum, clipped to `TOP_DB`
pub(crate) fn power_to_db(matrix: &mut FeatureMatrix) {
    to_db(matrix, 10.0);
}

/// Convert magnitude to dB relative to the matrix maximum, clipped to `TOP_DB`
pub(crate) fn amplitude_to_db(matrix: &mut FeatureMatrix) {
    to_db(matrix, 20.0);
}

fn to_db(matrix: &mut FeatureMatrix, factor: f32) {
    let reference = matrix.data.iter().cloned().fold(AMIN, f32::max);
    let ref_db = factor * reference.log10();

    for value in matrix.data.iter_mut() {
        *value = factor * value.max(AMIN).log10() - ref_db;
    }
    for value in matrix.data.iter_mut() {
        *value = value.max(-TOP_DB);
    }
}
