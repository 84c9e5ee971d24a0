//! Dataset discovery
//!
//! Audio lives directly under `<data_root>/<partition>/<folder>/`. Only the
//! folder's own entries are read, so every file's category is the folder it
//! was requested under. Files come back in path order, one folder after the
//! other in the order they were requested.

use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::engine::is_supported_audio;
use crate::error::{GraphgenError, Result};

/// Collect the audio files of a partition
///
/// # Arguments
/// * `data_root` - Root of the dataset tree
/// * `partition` - Partition directory, e.g. "training"
/// * `folders` - Category folders to include, in output order
///
/// # Errors
/// * `FolderNotFound` - If a requested folder does not exist
/// * `DiscoveryError` - If walking a folder fails
pub fn discover_audio_files(
    data_root: &Path,
    partition: &str,
    folders: &[String],
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for folder in folders {
        let folder_path = data_root.join(partition).join(folder);
        if !folder_path.is_dir() {
            return Err(GraphgenError::FolderNotFound { path: folder_path });
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(&folder_path).max_depth(1) {
            let entry = entry.map_err(|e| GraphgenError::DiscoveryError {
                path: folder_path.clone(),
                reason: e.to_string(),
            })?;

            if entry.file_type().is_file() && is_supported_audio(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();

        debug!("{}: {} audio files", folder_path.display(), found.len());
        files.extend(found);
    }

    info!(
        "Discovered {} audio files in partition '{}' ({} folders)",
        files.len(),
        partition,
        folders.len()
    );

    Ok(files)
}
