//! Output path layout
//!
//! Images land in `<root>/data/graphs/<partition>/<category>/<feature>/` and raw
//! arrays in the parallel `<root>/data/raw/...` tree. Paths depend only on
//! those components and the file stem, never on the process state.

use std::fs;
use std::path::{Path, PathBuf};

use crate::augment::AugmentationSpec;
use crate::error::{GraphgenError, Result};
use crate::features::FeatureType;

/// Extension of rendered graphs
pub const GRAPH_EXTENSION: &str = "png";

/// Extension of raw feature arrays
pub const RAW_EXTENSION: &str = "npy";

/// Output tree for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    partition: String,
    feature_type: FeatureType,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, partition: impl Into<String>, feature_type: FeatureType) -> Self {
        Self {
            root: root.into(),
            partition: partition.into(),
            feature_type,
        }
    }

    fn dir(&self, kind: &str, category: &str) -> PathBuf {
        self.root
            .join("data")
            .join(kind)
            .join(&self.partition)
            .join(category)
            .join(self.feature_type.name())
    }

    /// Directory holding the graphs of a category
    pub fn graph_dir(&self, category: &str) -> PathBuf {
        self.dir("graphs", category)
    }

    /// Directory holding the raw arrays of a category
    pub fn raw_dir(&self, category: &str) -> PathBuf {
        self.dir("raw", category)
    }

    /// Full path of a graph image
    pub fn graph_path(&self, category: &str, stem: &str) -> PathBuf {
        self.graph_dir(category)
            .join(format!("{}.{}", stem, GRAPH_EXTENSION))
    }

    /// Full path of a raw array
    pub fn raw_path(&self, category: &str, stem: &str) -> PathBuf {
        self.raw_dir(category).join(format!("{}.{}", stem, RAW_EXTENSION))
    }
}

/// Category label of an input file: its immediate parent directory name
pub fn category_of(path: &Path) -> Result<String> {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| GraphgenError::DiscoveryError {
            path: path.to_path_buf(),
            reason: "file has no parent directory to use as category".to_string(),
        })
}

/// Output stem of an input file
///
/// The file name without its extension, followed by `_<label>` when an
/// augmentation is active.
pub fn output_stem(path: &Path, augmentation: Option<&AugmentationSpec>) -> Result<String> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| GraphgenError::DiscoveryError {
            path: path.to_path_buf(),
            reason: "file has no name".to_string(),
        })?;

    Ok(match augmentation {
        Some(spec) => format!("{}_{}", stem, spec.label()),
        None => stem,
    })
}

/// Create a directory and its parents, succeeding if it already exists
///
/// A directory created concurrently by another process counts as existing.
/// Any other failure, including a regular file in the way, is returned.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| GraphgenError::DirectoryCreateError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_graph_and_raw_paths() {
        let layout = OutputLayout::new("/out", "training", FeatureType::MelSpectrogram);

        assert_eq!(
            layout.graph_path("ff1010bird", "clip1"),
            PathBuf::from("/out/data/graphs/training/ff1010bird/melspectrogram/clip1.png")
        );
        assert_eq!(
            layout.raw_path("ff1010bird", "clip1"),
            PathBuf::from("/out/data/raw/training/ff1010bird/melspectrogram/clip1.npy")
        );
    }

    #[test]
    fn test_paths_are_deterministic() {
        let a = OutputLayout::new("/out", "testing", FeatureType::Mfcc);
        let b = OutputLayout::new("/out", "testing", FeatureType::Mfcc);
        assert_eq!(a.graph_path("x", "y"), b.graph_path("x", "y"));
    }

    #[test]
    fn test_category_and_stem() {
        let path = Path::new("/data/audio/ff1010bird/clip1.wav");
        assert_eq!(category_of(path).unwrap(), "ff1010bird");
        assert_eq!(output_stem(path, None).unwrap(), "clip1");

        let dotted = Path::new("/data/audio/ff1010bird/clip.take2.wav");
        assert_eq!(output_stem(dotted, None).unwrap(), "clip.take2");
    }

    #[test]
    fn test_augmentation_changes_stem() {
        let path = Path::new("/data/audio/ff1010bird/clip1.wav");
        let spec = AugmentationSpec::from_flags(0, true, 1).unwrap();

        let plain = output_stem(path, None).unwrap();
        let augmented = output_stem(path, Some(&spec)).unwrap();
        assert_eq!(augmented, "clip1_randomnoise");
        assert_ne!(plain, augmented);
    }

    #[test]
    fn test_category_requires_parent() {
        assert!(category_of(Path::new("clip1.wav")).is_err());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a/b/c");

        ensure_dir(&target).unwrap();
        ensure_dir(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_ensure_dir_under_a_file_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        match ensure_dir(&blocker.join("child")) {
            Err(GraphgenError::DirectoryCreateError { path, .. }) => {
                assert!(path.ends_with("blocker/child"));
            }
            other => panic!("Expected DirectoryCreateError, got: {:?}", other),
        }
    }

    #[test]
    fn test_ensure_dir_on_existing_file_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, b"").unwrap();

        assert!(ensure_dir(&file).is_err());
    }
}
