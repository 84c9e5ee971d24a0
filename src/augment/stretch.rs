//! Phase-vocoder time stretching
//!
//! Speeds the signal up by `rate` without changing its pitch: the STFT is
//! resampled along time, magnitudes are interpolated between neighbouring
//! frames and phases are re-accumulated from the per-bin phase advance.

use std::f32::consts::PI;

use rustfft::num_complex::Complex;

use crate::features::stft::Stft;

/// Stretch `samples` by `rate` (>1 shortens, <1 lengthens)
///
/// Output length is `round(len / rate)`, and never less than one sample.
pub fn time_stretch(samples: &[f32], rate: f32) -> Vec<f32> {
    if samples.is_empty() || rate <= 0.0 {
        return samples.to_vec();
    }

    let stft = Stft::default();
    let spectrum = stft.forward(samples);
    let stretched = phase_vocoder(&spectrum, rate, stft.hop_length(), stft.n_fft());
    let length = ((samples.len() as f32 / rate).round() as usize).max(1);

    stft.inverse(&stretched, length)
}

fn phase_vocoder(
    spectrum: &[Vec<Complex<f32>>],
    rate: f32,
    hop_length: usize,
    n_fft: usize,
) -> Vec<Vec<Complex<f32>>> {
    let Some(first) = spectrum.first() else {
        return Vec::new();
    };
    let n_bins = first.len();
    let n_frames = spectrum.len();

    // Expected phase advance per hop for each bin centre
    let phase_advance: Vec<f32> = (0..n_bins)
        .map(|k| 2.0 * PI * hop_length as f32 * k as f32 / n_fft as f32)
        .collect();

    let silence = vec![Complex::new(0.0, 0.0); n_bins];
    let mut phase: Vec<f32> = first.iter().map(|c| c.arg()).collect();
    let mut output = Vec::with_capacity((n_frames as f32 / rate).ceil() as usize);

    let mut step = 0usize;
    loop {
        let t = step as f32 * rate;
        if t >= n_frames as f32 {
            break;
        }

        let left = t.floor() as usize;
        let alpha = t - left as f32;
        let current = &spectrum[left];
        let next = spectrum.get(left + 1).unwrap_or(&silence);

        let frame = (0..n_bins)
            .map(|k| {
                let magnitude = (1.0 - alpha) * current[k].norm() + alpha * next[k].norm();
                Complex::from_polar(magnitude, phase[k])
            })
            .collect();
        output.push(frame);

        for k in 0..n_bins {
            let mut delta = next[k].arg() - current[k].arg() - phase_advance[k];
            delta -= 2.0 * PI * (delta / (2.0 * PI)).round();
            phase[k] += phase_advance[k] + delta;
        }

        step += 1;
    }

    output
}
