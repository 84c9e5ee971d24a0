//! Graph Generator
//!
//! Batch driver: for every discovered audio file, in discovery order,
//! 1. derive the category (parent folder) and output stem
//! 2. make sure the graph directory exists
//! 3. decode the audio
//! 4. apply the augmentation, if any
//! 5. compute the feature matrix
//! 6. write the graph image
//! 7. optionally write the raw matrix
//!
//! Processing is sequential. The first failure aborts the batch unless
//! `keep_going` is set, in which case per-file failures are collected and
//! the batch continues.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GeneratorConfig;
use crate::discovery::discover_audio_files;
use crate::engine::import_audio;
use crate::error::{GraphgenError, Result};
use crate::features::compute_features;
use crate::output::{category_of, ensure_dir, output_stem, write_graph, write_npy, OutputLayout};

/// Files written for one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Input audio file
    pub source: PathBuf,
    /// Rendered graph
    pub graph: PathBuf,
    /// Raw feature array, when raw output is enabled
    pub raw: Option<PathBuf>,
}

/// A file skipped in keep-going mode
#[derive(Debug)]
pub struct FileFailure {
    pub source: PathBuf,
    pub error: GraphgenError,
}

/// Outcome of a completed batch
#[derive(Debug, Default)]
pub struct RunSummary {
    pub generated: Vec<GeneratedArtifact>,
    pub failed: Vec<FileFailure>,
}

impl RunSummary {
    /// Number of files the batch visited
    pub fn total(&self) -> usize {
        self.generated.len() + self.failed.len()
    }

    /// `BatchIncomplete` if any file was skipped
    pub fn ensure_complete(&self) -> Result<()> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(GraphgenError::BatchIncomplete {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

/// Generates graphs for every audio file of a partition
#[derive(Debug)]
pub struct GraphGenerator {
    config: GeneratorConfig,
    layout: OutputLayout,
    files: Vec<PathBuf>,
}

impl GraphGenerator {
    /// Validate the configuration and discover the input files
    ///
    /// # Errors
    /// * `ConfigError` - If the configuration is invalid
    /// * `FolderNotFound` / `DiscoveryError` - If a folder cannot be scanned
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let files = discover_audio_files(
            &config.resolved_data_root(),
            &config.partition,
            &config.folders,
        )?;
        Self::with_files(config, files)
    }

    /// Use an explicit file list instead of scanning the data root
    pub fn with_files(config: GeneratorConfig, files: Vec<PathBuf>) -> Result<Self> {
        config.validate()?;
        let layout = OutputLayout::new(
            config.output_root.clone(),
            config.partition.clone(),
            config.feature_type,
        );

        Ok(Self {
            config,
            layout,
            files,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Input files in processing order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Process every file
    ///
    /// Returns once all files were visited. In fail-fast mode (the default)
    /// the first error is returned immediately; files written before it stay
    /// on disk.
    pub fn generate_graphs(&self) -> Result<RunSummary> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "Generating {} graphs for {} files (partition '{}', augmentation: {})",
            self.config.feature_type,
            self.files.len(),
            self.config.partition,
            self.config
                .augmentation
                .as_ref()
                .map(|a| a.label())
                .unwrap_or_else(|| "none".to_string())
        );

        let progress = self.progress_bar();
        let mut summary = RunSummary::default();
        let mut written = HashSet::new();

        for file in &self.files {
            progress.set_message(
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );

            match self.process_file(file, &mut rng) {
                Ok(artifact) => {
                    if !written.insert(artifact.graph.clone()) {
                        warn!(
                            "{} overwrote an earlier graph at {}",
                            file.display(),
                            artifact.graph.display()
                        );
                    }
                    summary.generated.push(artifact);
                }
                Err(e) if self.config.keep_going && e.is_per_file() => {
                    warn!("Skipping {}: {}", file.display(), e);
                    summary.failed.push(FileFailure {
                        source: file.clone(),
                        error: e,
                    });
                }
                Err(e) => {
                    progress.abandon();
                    error!("Aborting batch at {}: {}", file.display(), e);
                    return Err(e);
                }
            }

            progress.inc(1);
        }

        progress.finish_with_message("done");
        info!(
            "Generation complete: {} written, {} failed",
            summary.generated.len(),
            summary.failed.len()
        );

        Ok(summary)
    }

    /// Run the whole pipeline for one file
    pub fn process_file<R: Rng + ?Sized>(&self, path: &Path, rng: &mut R) -> Result<GeneratedArtifact> {
        let category = category_of(path)?;
        let stem = output_stem(path, self.config.augmentation.as_ref())?;

        ensure_dir(&self.layout.graph_dir(&category))?;
        let graph_path = self.layout.graph_path(&category, &stem);

        let mut buffer = import_audio(path, self.config.sample_rate)?;
        if let Some(augmentation) = &self.config.augmentation {
            buffer = augmentation.apply(buffer, rng);
        }

        let features = compute_features(&buffer.samples, buffer.sample_rate, self.config.feature_type);
        write_graph(&features, &graph_path, self.config.feature_type)?;

        let raw = if self.config.save_raw {
            ensure_dir(&self.layout.raw_dir(&category))?;
            let raw_path = self.layout.raw_path(&category, &stem);
            write_npy(&features, &raw_path)?;
            Some(raw_path)
        } else {
            None
        };

        debug!("{} -> {}", path.display(), graph_path.display());

        Ok(GeneratedArtifact {
            source: path.to_path_buf(),
            graph: graph_path,
            raw,
        })
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(self.files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);
        progress
    }
}
