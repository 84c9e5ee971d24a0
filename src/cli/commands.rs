//! CLI Command Implementations
//!
//! Resolves the job configuration from defaults, an optional JSON file and
//! the command line, then runs the generator.

use std::env;
use std::path::Path;

use log::info;

use super::Cli;
use crate::augment::AugmentationSpec;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::generator::GraphGenerator;

/// Build the job configuration
///
/// Precedence: command line, then the `--config` file, then defaults. The
/// three augmentation positionals are taken together: if any of them is
/// given they replace the file's augmentation entirely.
pub fn resolve_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading job configuration: {}", path.display());
            GeneratorConfig::from_json_file(path)?
        }
        None => GeneratorConfig::default(),
    };

    if let Some(type_graph) = &cli.type_graph {
        config.feature_type = type_graph.parse()?;
    }
    if let Some(folder_type) = &cli.folder_type {
        config.partition = folder_type.clone();
    }
    if let Some(folders) = &cli.folders {
        config.folders = folders
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
    }

    if cli.additive_noise.is_some() || cli.random_noise.is_some() || cli.time_stretch_rate.is_some() {
        config.augmentation = AugmentationSpec::from_flags(
            cli.additive_noise.unwrap_or(0),
            cli.random_noise.unwrap_or(false),
            cli.time_stretch_rate.unwrap_or(1),
        );
    }

    match &cli.output_root {
        Some(root) => config.output_root = root.clone(),
        None if config.output_root == Path::new(".") => config.output_root = env::current_dir()?,
        None => {}
    }
    if let Some(data_root) = &cli.data_root {
        config.data_root = Some(data_root.clone());
    }

    if cli.save_raw {
        config.save_raw = true;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if cli.native_rate {
        config.sample_rate = None;
    } else if let Some(rate) = cli.sample_rate {
        config.sample_rate = Some(rate);
    }
    if cli.keep_going {
        config.keep_going = true;
    }
    if cli.no_progress {
        config.show_progress = false;
    }

    config.validate()?;
    Ok(config)
}

/// Run the command line
pub fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;

    if cli.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    generate(config)
}

/// Generate graphs for a resolved configuration
pub fn generate(config: GeneratorConfig) -> Result<()> {
    let generator = GraphGenerator::new(config)?;
    let summary = generator.generate_graphs()?;

    println!(
        "Generated {} graphs under {}",
        summary.generated.len(),
        generator.config().output_root.join("data").display()
    );
    for failure in &summary.failed {
        println!("  failed: {} ({})", failure.source.display(), failure.error);
    }

    summary.ensure_complete()
}
