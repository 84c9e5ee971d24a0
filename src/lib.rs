//! graphgen - Spectrogram Dataset Generator
//!
//! Turns folders of audio recordings into images (and optionally raw arrays)
//! for training audio classifiers.
//!
//! # Pipeline
//!
//! For each discovered file: decode → augment (optional) → compute features →
//! render PNG → save `.npy` (optional). Outputs mirror the input tree:
//! `<root>/data/graphs/<partition>/<category>/<feature>/<stem>[_<label>].png`.

pub mod augment;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod features;
pub mod generator;
pub mod output;

pub use augment::{Augmentation, AugmentationSpec};
pub use config::GeneratorConfig;
pub use error::{GraphgenError, Result};
pub use features::{FeatureMatrix, FeatureType};
pub use generator::{GeneratedArtifact, GraphGenerator, RunSummary};
