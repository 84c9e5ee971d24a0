//! Mel spectrogram and MFCC

use std::f32::consts::PI;

use super::stft::Stft;
use super::{power_to_db, power_spectrum, FeatureMatrix};

/// Number of mel bands
pub const N_MELS: usize = 128;

/// Number of cepstral coefficients
pub const N_MFCC: usize = 20;

/// Hz to Mel conversion
fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Mel to Hz conversion
fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank, `n_mels × n_bins`
pub fn mel_filterbank(bin_freqs: &[f32], n_mels: usize, fmin: f32, fmax: f32) -> Vec<Vec<f32>> {
    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let mel_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32))
        .collect();

    let mut filters = vec![vec![0.0; bin_freqs.len()]; n_mels];

    for (i, filter) in filters.iter_mut().enumerate() {
        let left = mel_points[i];
        let center = mel_points[i + 1];
        let right = mel_points[i + 2];

        for (j, &freq) in bin_freqs.iter().enumerate() {
            if freq >= left && freq <= center {
                filter[j] = (freq - left) / (center - left);
            } else if freq > center && freq <= right {
                filter[j] = (right - freq) / (right - center);
            }
        }
    }

    filters
}

/// Log-power mel spectrogram, `N_MELS × frames`, in dB
pub fn melspectrogram(samples: &[f32], sample_rate: u32, stft: &Stft) -> FeatureMatrix {
    let power = power_spectrum(&stft.forward(samples));
    let filters = mel_filterbank(
        &stft.bin_frequencies(sample_rate),
        N_MELS,
        0.0,
        sample_rate as f32 / 2.0,
    );

    let frames = power.len();
    let mut mel = FeatureMatrix::zeros(N_MELS, frames, sample_rate);
    for (t, frame) in power.iter().enumerate() {
        for (m, filter) in filters.iter().enumerate() {
            let energy: f32 = filter.iter().zip(frame.iter()).map(|(f, p)| f * p).sum();
            mel.set(m, t, energy);
        }
    }

    power_to_db(&mut mel);
    mel
}

/// Mel-frequency cepstral coefficients, `N_MFCC × frames`
///
/// Orthonormal DCT-II over the mel bands of each frame.
pub fn mfcc(samples: &[f32], sample_rate: u32, stft: &Stft) -> FeatureMatrix {
    let mel = melspectrogram(samples, sample_rate, stft);
    let n = mel.rows();
    let basis = dct_basis(N_MFCC, n);

    let mut out = FeatureMatrix::zeros(N_MFCC, mel.cols(), sample_rate);
    for t in 0..mel.cols() {
        for (k, row) in basis.iter().enumerate() {
            let value: f32 = row.iter().enumerate().map(|(m, b)| b * mel.get(m, t)).sum();
            out.set(k, t, value);
        }
    }
    out
}

fn dct_basis(n_out: usize, n_in: usize) -> Vec<Vec<f32>> {
    let n = n_in as f32;
    (0..n_out)
        .map(|k| {
            let norm = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..n_in)
                .map(|m| norm * (PI * k as f32 * (2.0 * m as f32 + 1.0) / (2.0 * n)).cos())
                .collect()
        })
        .collect()
}
