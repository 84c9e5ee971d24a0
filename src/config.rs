//! Job configuration
//!
//! A `GeneratorConfig` is fixed for the whole run. It can be built in code,
//! loaded from a (partial) JSON file, and is overridden field by field by the
//! command line.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::augment::AugmentationSpec;
use crate::engine::DEFAULT_SAMPLE_RATE;
use crate::error::{GraphgenError, Result};
use crate::features::FeatureType;

/// Default dataset partition
pub const DEFAULT_PARTITION: &str = "training";

/// Default category folder
pub const DEFAULT_FOLDER: &str = "ff1010bird";

/// Configuration of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Which graph to generate
    pub feature_type: FeatureType,
    /// Dataset partition, e.g. "training" or "testing"
    pub partition: String,
    /// Category folders to include, processed in this order
    pub folders: Vec<String>,
    /// Augmentation applied before feature extraction
    pub augmentation: Option<AugmentationSpec>,
    /// Also persist the feature array as `.npy`
    pub save_raw: bool,
    /// Root of the `data/graphs` and `data/raw` output trees
    pub output_root: PathBuf,
    /// Root of the input tree; `<output_root>/data/audio` when unset
    pub data_root: Option<PathBuf>,
    /// Decode sample rate; `None` keeps each file's own rate
    pub sample_rate: Option<u32>,
    /// Seed for random noise, for reproducible runs
    pub seed: Option<u64>,
    /// Log per-file failures and continue instead of aborting
    pub keep_going: bool,
    /// Draw a progress bar over the file loop
    pub show_progress: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            feature_type: FeatureType::default(),
            partition: DEFAULT_PARTITION.to_string(),
            folders: vec![DEFAULT_FOLDER.to_string()],
            augmentation: None,
            save_raw: false,
            output_root: PathBuf::from("."),
            data_root: None,
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            seed: None,
            keep_going: false,
            show_progress: true,
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration from a JSON file
    ///
    /// Fields missing from the file keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| GraphgenError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: GeneratorConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Directory the dataset is discovered in
    pub fn resolved_data_root(&self) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| self.output_root.join("data").join("audio"))
    }

    /// Check the configuration before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.partition.trim().is_empty() {
            return Err(GraphgenError::ConfigError {
                reason: "partition name is empty".to_string(),
            });
        }

        if self.folders.is_empty() {
            return Err(GraphgenError::ConfigError {
                reason: "no folders to process".to_string(),
            });
        }

        if let Some(bad) = self
            .folders
            .iter()
            .find(|f| f.trim().is_empty() || f.contains(['/', '\\']) || f.as_str() == "..")
        {
            return Err(GraphgenError::ConfigError {
                reason: format!("invalid folder name '{}'", bad),
            });
        }

        if self.sample_rate == Some(0) {
            return Err(GraphgenError::ConfigError {
                reason: "sample rate must be positive".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.feature_type, FeatureType::MelSpectrogram);
        assert_eq!(config.partition, "training");
        assert_eq!(config.folders, vec!["ff1010bird".to_string()]);
        assert_eq!(config.augmentation, None);
        assert!(!config.save_raw);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job.json");
        fs::write(
            &path,
            r#"{
                "feature_type": "chromagram",
                "folders": ["birds", "frogs"],
                "augmentation": [{"kind": "random_noise"}],
                "sample_rate": null
            }"#,
        )
        .unwrap();

        let config = GeneratorConfig::from_json_file(&path).unwrap();
        assert_eq!(config.feature_type, FeatureType::Chromagram);
        assert_eq!(config.folders, vec!["birds".to_string(), "frogs".to_string()]);
        assert_eq!(config.augmentation.as_ref().map(|a| a.label()).as_deref(), Some("randomnoise"));
        assert_eq!(config.sample_rate, None);
        assert_eq!(config.partition, "training");
        assert!(config.show_progress);
    }

    #[test]
    fn test_unknown_feature_type_in_json() {
        let result: std::result::Result<GeneratorConfig, _> =
            serde_json::from_str(r#"{"feature_type": "tempogram"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = GeneratorConfig {
            augmentation: AugmentationSpec::from_flags(5, false, 2),
            seed: Some(42),
            ..GeneratorConfig::default()
        };

        let json = config.to_json_string().unwrap();
        let back: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_data_root_resolution() {
        let mut config = GeneratorConfig {
            output_root: PathBuf::from("/work"),
            ..GeneratorConfig::default()
        };
        assert_eq!(config.resolved_data_root(), PathBuf::from("/work/data/audio"));

        config.data_root = Some(PathBuf::from("/datasets"));
        assert_eq!(config.resolved_data_root(), PathBuf::from("/datasets"));
    }

    #[test]
    fn test_validate_rejects_bad_folders() {
        let empty = GeneratorConfig {
            folders: vec![],
            ..GeneratorConfig::default()
        };
        assert!(matches!(empty.validate(), Err(GraphgenError::ConfigError { .. })));

        let escaping = GeneratorConfig {
            folders: vec!["../etc".to_string()],
            ..GeneratorConfig::default()
        };
        assert!(escaping.validate().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = GeneratorConfig::from_json_file(Path::new("/nonexistent/job.json"));
        assert!(matches!(result, Err(GraphgenError::FileReadError { .. })));
    }
}
