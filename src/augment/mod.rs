//! Audio Augmentation
//!
//! Augmentations are a closed set of tagged variants. An `AugmentationSpec`
//! holds at most one of each, always in canonical order:
//! 1. Additive (fixed) noise
//! 2. Random noise
//! 3. Time stretch
//!
//! "No augmentation" is `Option::<AugmentationSpec>::None`; a spec is never
//! empty, so its label is never empty either.

pub mod noise;
pub mod stretch;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::AudioBuffer;
use crate::error::{GraphgenError, Result};

/// A single augmentation transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Augmentation {
    /// Deterministic Gaussian noise, std-dev `level * 0.001`
    AdditiveNoise { level: u32 },
    /// Gaussian noise with a randomly drawn amplitude
    RandomNoise,
    /// Pitch-preserving speed-up by an integer factor
    TimeStretch { rate: u32 },
}

impl Augmentation {
    /// Position in the canonical application order
    fn order(&self) -> u8 {
        match self {
            Augmentation::AdditiveNoise { .. } => 0,
            Augmentation::RandomNoise => 1,
            Augmentation::TimeStretch { .. } => 2,
        }
    }

    /// Filename fragment for this transform
    pub fn label(&self) -> String {
        match self {
            Augmentation::AdditiveNoise { level } => format!("noise{}", level),
            Augmentation::RandomNoise => "randomnoise".to_string(),
            Augmentation::TimeStretch { rate } => format!("stretch{}", rate),
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Augmentation::AdditiveNoise { level: 0 } => Err(GraphgenError::InvalidAugmentation {
                reason: "additive noise level must be at least 1".to_string(),
            }),
            Augmentation::TimeStretch { rate } if rate < 2 => {
                Err(GraphgenError::InvalidAugmentation {
                    reason: format!("time stretch rate must be at least 2, got {}", rate),
                })
            }
            _ => Ok(()),
        }
    }

    /// Apply the transform, returning the new samples
    pub fn apply<R: Rng + ?Sized>(&self, mut samples: Vec<f32>, rng: &mut R) -> Vec<f32> {
        match *self {
            Augmentation::AdditiveNoise { level } => {
                noise::add_fixed_noise(&mut samples, level);
                samples
            }
            Augmentation::RandomNoise => {
                noise::add_random_noise(&mut samples, rng);
                samples
            }
            Augmentation::TimeStretch { rate } => stretch::time_stretch(&samples, rate as f32),
        }
    }
}

/// Non-empty, canonically ordered set of augmentations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Augmentation>", into = "Vec<Augmentation>")]
pub struct AugmentationSpec {
    transforms: Vec<Augmentation>,
}

impl AugmentationSpec {
    /// Build a spec from transforms in any order
    ///
    /// # Errors
    /// `InvalidAugmentation` if the list is empty, repeats a kind, or holds
    /// an out-of-range parameter
    pub fn new(mut transforms: Vec<Augmentation>) -> Result<Self> {
        if transforms.is_empty() {
            return Err(GraphgenError::InvalidAugmentation {
                reason: "an augmentation spec needs at least one transform".to_string(),
            });
        }

        for transform in &transforms {
            transform.validate()?;
        }

        transforms.sort_by_key(Augmentation::order);
        if transforms.windows(2).any(|w| w[0].order() == w[1].order()) {
            return Err(GraphgenError::InvalidAugmentation {
                reason: "each augmentation kind may appear once".to_string(),
            });
        }

        Ok(Self { transforms })
    }

    /// Interpret the command-line flags
    ///
    /// `additive_noise > 0` enables fixed noise, `random_noise` enables random
    /// noise, and a `time_stretch_rate` that is positive and not 1 enables the
    /// stretch. Returns `None` when nothing is enabled.
    pub fn from_flags(additive_noise: i64, random_noise: bool, time_stretch_rate: i64) -> Option<Self> {
        let mut transforms = Vec::new();

        if additive_noise > 0 {
            transforms.push(Augmentation::AdditiveNoise {
                level: u32::try_from(additive_noise).unwrap_or(u32::MAX),
            });
        }
        if random_noise {
            transforms.push(Augmentation::RandomNoise);
        }
        if time_stretch_rate > 1 {
            transforms.push(Augmentation::TimeStretch {
                rate: u32::try_from(time_stretch_rate).unwrap_or(u32::MAX),
            });
        }

        Self::new(transforms).ok()
    }

    /// Transforms in application order
    pub fn transforms(&self) -> &[Augmentation] {
        &self.transforms
    }

    /// Label appended to output stems, e.g. `noise5_stretch2`
    pub fn label(&self) -> String {
        self.transforms
            .iter()
            .map(Augmentation::label)
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Apply every transform in order
    pub fn apply<R: Rng + ?Sized>(&self, buffer: AudioBuffer, rng: &mut R) -> AudioBuffer {
        let sample_rate = buffer.sample_rate;
        let samples = self
            .transforms
            .iter()
            .fold(buffer.samples, |samples, transform| transform.apply(samples, rng));
        AudioBuffer::new(samples, sample_rate)
    }
}

impl TryFrom<Vec<Augmentation>> for AugmentationSpec {
    type Error = GraphgenError;

    fn try_from(value: Vec<Augmentation>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AugmentationSpec> for Vec<Augmentation> {
    fn from(value: AugmentationSpec) -> Self {
        value.transforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::generate_test_tone;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    #[test_case(0, false, 1, None ; "nothing enabled")]
    #[test_case(0, false, 0, None ; "zero rate is off")]
    #[test_case(-3, false, -2, None ; "negatives are off")]
    #[test_case(0, true, 1, Some("randomnoise") ; "random only")]
    #[test_case(5, false, 1, Some("noise5") ; "additive only")]
    #[test_case(0, false, 2, Some("stretch2") ; "stretch only")]
    #[test_case(5, false, 2, Some("noise5_stretch2") ; "additive then stretch")]
    #[test_case(3, true, 4, Some("noise3_randomnoise_stretch4") ; "all three")]
    fn test_from_flags_label(additive: i64, random: bool, rate: i64, expected: Option<&str>) {
        let spec = AugmentationSpec::from_flags(additive, random, rate);
        assert_eq!(spec.map(|s| s.label()).as_deref(), expected);
    }

    #[test]
    fn test_new_sorts_into_canonical_order() {
        let spec = AugmentationSpec::new(vec![
            Augmentation::TimeStretch { rate: 2 },
            Augmentation::RandomNoise,
            Augmentation::AdditiveNoise { level: 1 },
        ])
        .unwrap();

        assert_eq!(
            spec.transforms(),
            &[
                Augmentation::AdditiveNoise { level: 1 },
                Augmentation::RandomNoise,
                Augmentation::TimeStretch { rate: 2 },
            ]
        );
    }

    #[test]
    fn test_new_rejects_bad_specs() {
        assert!(AugmentationSpec::new(vec![]).is_err());
        assert!(AugmentationSpec::new(vec![Augmentation::TimeStretch { rate: 1 }]).is_err());
        assert!(AugmentationSpec::new(vec![Augmentation::AdditiveNoise { level: 0 }]).is_err());
        assert!(AugmentationSpec::new(vec![
            Augmentation::RandomNoise,
            Augmentation::RandomNoise
        ])
        .is_err());
    }

    #[test]
    fn test_serde_round_trip_is_validated() {
        let spec = AugmentationSpec::from_flags(5, false, 2).unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"[{"kind":"additive_noise","level":5},{"kind":"time_stretch","rate":2}]"#
        );
        assert_eq!(serde_json::from_str::<AugmentationSpec>(&json).unwrap(), spec);
        assert!(serde_json::from_str::<AugmentationSpec>("[]").is_err());
    }

    #[test]
    fn test_apply_additive_and_stretch() {
        let tone = generate_test_tone(440.0, 1.0, 22050);
        let spec = AugmentationSpec::from_flags(5, false, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let out = spec.apply(tone.clone(), &mut rng);
        assert_eq!(out.sample_rate, 22050);
        assert_eq!(out.len(), tone.len() / 2 + tone.len() % 2);
        assert_ne!(out.samples[..100], tone.samples[..100]);
    }

    #[test]
    fn test_noise_keeps_length() {
        let tone = generate_test_tone(440.0, 0.2, 22050);
        let spec = AugmentationSpec::from_flags(2, true, 1).unwrap();
        let out = spec.apply(tone.clone(), &mut StdRng::seed_from_u64(3));
        assert_eq!(out.len(), tone.len());
    }
}
