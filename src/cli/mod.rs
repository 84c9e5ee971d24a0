//! CLI Module
//!
//! Command-line interface for the graph generator. The six positional
//! arguments mirror the job parameters; everything else is an option.

pub mod commands;

use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;

/// Generate spectrogram images (and optional raw arrays) from an audio dataset
#[derive(Parser, Debug, Default)]
#[command(name = "graphgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Type of graph: melspectrogram, spectrogram, mfcc, chromagram, waveform
    /// [default: melspectrogram]
    pub type_graph: Option<String>,

    /// Dataset partition folder, e.g. training or testing [default: training]
    pub folder_type: Option<String>,

    /// Comma-separated category folders [default: ff1010bird]
    pub folders: Option<String>,

    /// Additive noise level; values above 0 enable fixed noise [default: 0]
    #[arg(allow_negative_numbers = true)]
    pub additive_noise: Option<i64>,

    /// Enable random noise (true/false) [default: false]
    #[arg(value_parser = BoolishValueParser::new())]
    pub random_noise: Option<bool>,

    /// Time stretch rate; values above 1 enable stretching [default: 1]
    #[arg(allow_negative_numbers = true)]
    pub time_stretch_rate: Option<i64>,

    /// JSON job file; command-line values take precedence over it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root of the data/graphs and data/raw trees [default: current directory]
    #[arg(short, long)]
    pub output_root: Option<PathBuf>,

    /// Root of the audio dataset [default: <output-root>/data/audio]
    #[arg(short, long)]
    pub data_root: Option<PathBuf>,

    /// Also save the raw feature arrays as .npy
    #[arg(long)]
    pub save_raw: bool,

    /// Seed for random noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Decode sample rate in Hz [default: 22050]
    #[arg(long, conflicts_with = "native_rate")]
    pub sample_rate: Option<u32>,

    /// Keep each file's own sample rate
    #[arg(long)]
    pub native_rate: bool,

    /// Skip files that fail to decode instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Print the resolved job configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
