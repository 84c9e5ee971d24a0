//! Noise injection

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Noise standard deviation per additive-noise level
pub const NOISE_STEP: f32 = 0.001;

/// Amplitude range drawn for random noise
pub const RANDOM_NOISE_RANGE: std::ops::Range<f32> = 0.001..0.01;

/// Base seed for fixed noise; the level is mixed in
const FIXED_NOISE_SEED: u64 = 0x6e6f_6973_6500;

/// Standard normal sample (Box-Muller)
fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // gen() is in [0, 1); flip it so ln() never sees zero
    let u1: f32 = 1.0 - rng.gen::<f32>();
    let u2: f32 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}

fn add_gaussian<R: Rng + ?Sized>(samples: &mut [f32], amplitude: f32, rng: &mut R) {
    for sample in samples.iter_mut() {
        *sample += amplitude * gaussian(rng);
    }
}

/// Add the fixed noise pattern for `level`
///
/// The same level always adds the same noise.
pub fn add_fixed_noise(samples: &mut [f32], level: u32) {
    let mut rng = StdRng::seed_from_u64(FIXED_NOISE_SEED ^ level as u64);
    add_gaussian(samples, level as f32 * NOISE_STEP, &mut rng);
}

/// Add noise with an amplitude drawn from `RANDOM_NOISE_RANGE`
///
/// Returns the amplitude used.
pub fn add_random_noise<R: Rng + ?Sized>(samples: &mut [f32], rng: &mut R) -> f32 {
    let amplitude = rng.gen_range(RANDOM_NOISE_RANGE);
    add_gaussian(samples, amplitude, rng);
    amplitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::calculate_rms;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_noise_is_repeatable() {
        let mut a = vec![0.0; 1000];
        let mut b = vec![0.0; 1000];
        add_fixed_noise(&mut a, 5);
        add_fixed_noise(&mut b, 5);
        assert_eq!(a, b);

        let mut c = vec![0.0; 1000];
        add_fixed_noise(&mut c, 6);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fixed_noise_level_sets_amplitude() {
        let mut samples = vec![0.0; 20000];
        add_fixed_noise(&mut samples, 10);
        assert_relative_eq!(calculate_rms(&samples), 0.01, max_relative = 0.05);
    }

    #[test]
    fn test_random_noise_amplitude_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut samples = vec![0.0; 20000];
        let amplitude = add_random_noise(&mut samples, &mut rng);

        assert!(RANDOM_NOISE_RANGE.contains(&amplitude));
        assert_relative_eq!(calculate_rms(&samples), amplitude, max_relative = 0.05);
    }

    #[test]
    fn test_seeded_random_noise_reproducible() {
        let mut a = vec![0.0; 100];
        let mut b = vec![0.0; 100];
        add_random_noise(&mut a, &mut StdRng::seed_from_u64(1));
        add_random_noise(&mut b, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
