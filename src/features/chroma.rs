//! Chromagram
//!
//! Folds STFT power into the twelve pitch classes, C first.

use super::stft::Stft;
use super::{power_spectrum, FeatureMatrix};

/// Number of pitch classes
pub const N_CHROMA: usize = 12;

/// Lowest frequency that contributes to a pitch class
const MIN_FREQ_HZ: f32 = 27.5;

/// Pitch class of a frequency (C = 0, A = 9)
pub fn pitch_class(freq_hz: f32) -> usize {
    let midi = 69.0 + 12.0 * (freq_hz / 440.0).log2();
    (midi.round() as i64).rem_euclid(N_CHROMA as i64) as usize
}

/// Chroma energy, `N_CHROMA × frames`, each frame scaled so its maximum is 1
pub fn chromagram(samples: &[f32], sample_rate: u32, stft: &Stft) -> FeatureMatrix {
    let power = power_spectrum(&stft.forward(samples));
    let classes: Vec<Option<usize>> = stft
        .bin_frequencies(sample_rate)
        .into_iter()
        .map(|f| (f >= MIN_FREQ_HZ).then(|| pitch_class(f)))
        .collect();

    let mut chroma = FeatureMatrix::zeros(N_CHROMA, power.len(), sample_rate);
    for (t, frame) in power.iter().enumerate() {
        let mut energy = [0.0_f32; N_CHROMA];
        for (p, class) in frame.iter().zip(classes.iter()) {
            if let Some(c) = class {
                energy[*c] += p;
            }
        }

        let peak = energy.iter().cloned().fold(0.0_f32, f32::max);
        for (c, value) in energy.iter().enumerate() {
            let normalized = if peak > 0.0 { value / peak } else { 0.0 };
            chroma.set(c, t, normalized);
        }
    }

    chroma
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::generate_test_tone;
    use test_case::test_case;

    #[test_case(440.0, 9 ; "a4")]
    #[test_case(261.63, 0 ; "middle c")]
    #[test_case(880.0, 9 ; "a5")]
    #[test_case(392.0, 7 ; "g4")]
    fn test_pitch_class(freq: f32, expected: usize) {
        assert_eq!(pitch_class(freq), expected);
    }

    #[test]
    fn test_a440_lights_up_a() {
        let stft = Stft::default();
        let tone = generate_test_tone(440.0, 1.0, 22050);
        let chroma = chromagram(&tone.samples, 22050, &stft);

        assert_eq!(chroma.rows(), N_CHROMA);
        let t = chroma.cols() / 2;
        assert_eq!(chroma.get(9, t), 1.0);
        assert!(chroma.get(2, t) < 0.5);
    }

    #[test]
    fn test_silence_is_zero() {
        let stft = Stft::default();
        let chroma = chromagram(&vec![0.0; 4096], 22050, &stft);
        assert_eq!(chroma.min_max(), (0.0, 0.0));
    }
}
