pub mod commands;

use crate::bio::fasta::{read_sequences, InputFormat};
use crate::bio::sequence::{Alphabet, Sequence};
use crate::core::config::{default_config, load_config, Config};
use crate::report::ReportFormat;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "seqtree",
    version,
    about = "Pairwise global alignment and WPGMA clustering of biological sequences",
    long_about = "Seqtree aligns every pair of input sequences with Needleman-Wunsch, turns \
                  the alignments into an evolutionary distance matrix and builds a WPGMA \
                  dendrogram from it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true, env = "SEQTREE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Globally align two sequences from an input file
    Align(commands::align::AlignArgs),

    /// Compute the pairwise distance matrix
    Matrix(commands::matrix::MatrixArgs),

    /// Build a WPGMA tree from the pairwise distances
    Cluster(commands::cluster::ClusterArgs),

    /// Print the effective configuration as TOML
    Config(commands::config::ConfigArgs),
}

/// Input options shared by every command that reads sequences.
#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Input sequence file (.gz is decompressed)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Input layout (labelled, fasta); overrides the config file
    #[arg(long = "input-format", value_name = "FORMAT")]
    pub input_format: Option<InputFormat>,

    /// Residue alphabet (dna, rna, protein); overrides the config file
    #[arg(long)]
    pub alphabet: Option<Alphabet>,
}

impl InputArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(format) = self.input_format {
            config.sequences.format = format;
        }
        if let Some(alphabet) = self.alphabet {
            config.sequences.alphabet = alphabet;
        }
    }

    pub fn read(&self, config: &Config) -> anyhow::Result<Vec<Sequence>> {
        let spinner = create_spinner(format!("Loading {}...", self.input.display()));
        self.read_with(config, &spinner)
    }

    /// The spinner is cleared on failure too, before the error banner prints.
    fn read_with(&self, config: &Config, spinner: &ProgressBar) -> anyhow::Result<Vec<Sequence>> {
        let sequences = read_sequences(
            &self.input,
            config.sequences.format,
            config.sequences.alphabet,
        );
        spinner.finish_and_clear();
        Ok(sequences?)
    }
}

/// The config file when one is given, defaults otherwise.
pub fn resolve_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(default_config()),
    }
}

pub fn resolve_format(requested: Option<ReportFormat>, config: &Config) -> ReportFormat {
    requested.unwrap_or(config.output.format)
}

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
