//! Audio Engine Module
//!
//! Decoding side of the pipeline:
//! - Mono audio buffer
//! - WAV import with downmix and resampling

pub mod buffer;
pub mod io;

pub use buffer::{AudioBuffer, DEFAULT_SAMPLE_RATE};
pub use io::{export_wav, generate_test_tone, import_audio, is_supported_audio};
