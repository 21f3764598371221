use clap::Parser;
use colored::*;
use seqtree::cli::{Cli, Commands};
use seqtree::SeqtreeError;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // SEQTREE_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("SEQTREE_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        let seqtree_error = e.downcast_ref::<SeqtreeError>();
        match seqtree_error {
            Some(err) if err.is_malformed_input() => {
                eprintln!("{} malformed input: {}", "Error:".red().bold(), e);
            }
            _ => eprintln!("{} {}", "Error:".red().bold(), e),
        }

        let exit_code = match seqtree_error {
            Some(SeqtreeError::Config(_)) => 2,
            Some(SeqtreeError::Io(_)) => 3,
            Some(SeqtreeError::Parse(_))
            | Some(SeqtreeError::Input(_))
            | Some(SeqtreeError::InsufficientData(_)) => 4,
            Some(SeqtreeError::InternalConsistency(_)) => 70,
            None => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Align(args) => seqtree::cli::commands::align::run(args, config),
        Commands::Matrix(args) => seqtree::cli::commands::matrix::run(args, config),
        Commands::Cluster(args) => seqtree::cli::commands::cluster::run(args, config),
        Commands::Config(args) => seqtree::cli::commands::config::run(args, config),
    }
}
