//! Error handling for graphgen
//!
//! Every failure carries a stable error code and, where it helps, a list of
//! recovery suggestions printed by the CLI.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for graphgen operations
pub type Result<T> = std::result::Result<T, GraphgenError>;

/// Main error type for graphgen operations
#[derive(Error, Debug)]
pub enum GraphgenError {
    // Discovery Errors
    #[error("Dataset folder not found: {path}")]
    FolderNotFound { path: PathBuf },

    #[error("Failed to scan {path}: {reason}")]
    DiscoveryError { path: PathBuf, reason: String },

    // Decode Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid audio file {path}: {reason}")]
    InvalidAudio {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples: {path}")]
    EmptyAudio { path: PathBuf },

    // Processing Errors
    #[error("Unsupported feature type: {name}")]
    UnsupportedFeatureType { name: String },

    #[error("Invalid augmentation: {reason}")]
    InvalidAugmentation { reason: String },

    #[error("Feature data is empty ({rows}x{cols})")]
    EmptyFeature { rows: usize, cols: usize },

    // Output Errors
    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write image {path}: {source}")]
    ImageWriteError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid NPY file {path}: {reason}")]
    InvalidNpy { path: PathBuf, reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Batch Errors
    #[error("{failed} of {total} files failed")]
    BatchIncomplete { failed: usize, total: usize },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphgenError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphgenError::FolderNotFound { .. } => "FOLDER_NOT_FOUND",
            GraphgenError::DiscoveryError { .. } => "DISCOVERY_ERROR",
            GraphgenError::FileNotFound { .. } => "FILE_NOT_FOUND",
            GraphgenError::InvalidAudio { .. } => "INVALID_AUDIO",
            GraphgenError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            GraphgenError::EmptyAudio { .. } => "EMPTY_AUDIO",
            GraphgenError::UnsupportedFeatureType { .. } => "UNSUPPORTED_FEATURE_TYPE",
            GraphgenError::InvalidAugmentation { .. } => "INVALID_AUGMENTATION",
            GraphgenError::EmptyFeature { .. } => "EMPTY_FEATURE",
            GraphgenError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            GraphgenError::ImageWriteError { .. } => "IMAGE_WRITE_ERROR",
            GraphgenError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            GraphgenError::FileReadError { .. } => "FILE_READ_ERROR",
            GraphgenError::InvalidNpy { .. } => "INVALID_NPY",
            GraphgenError::ConfigError { .. } => "CONFIG_ERROR",
            GraphgenError::Serialization(_) => "SERIALIZATION_ERROR",
            GraphgenError::BatchIncomplete { .. } => "BATCH_INCOMPLETE",
            GraphgenError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the error is tied to a single input file.
    ///
    /// Keep-going mode only isolates these; anything else still aborts the run.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            GraphgenError::FileNotFound { .. }
                | GraphgenError::InvalidAudio { .. }
                | GraphgenError::UnsupportedFormat { .. }
                | GraphgenError::EmptyAudio { .. }
                | GraphgenError::EmptyFeature { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            GraphgenError::FolderNotFound { .. } => vec![
                "Check the partition and folder names",
                "Pass --data-root if the dataset lives outside ./data/audio",
            ],
            GraphgenError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "Re-export the file as WAV",
                "Use --keep-going to skip broken files",
            ],
            GraphgenError::UnsupportedFormat { .. } => vec![
                "Convert to 8, 16, 24 or 32-bit WAV",
            ],
            GraphgenError::UnsupportedFeatureType { .. } => vec![
                "Supported types: melspectrogram, spectrogram, mfcc, chromagram, waveform",
            ],
            GraphgenError::DirectoryCreateError { .. } => vec![
                "Check write permissions on the output root",
                "Make sure no regular file shadows an output directory",
                "Free up disk space",
            ],
            GraphgenError::BatchIncomplete { .. } => vec![
                "See the log above for the failing files",
            ],
            _ => vec![],
        }
    }
}
