use crate::cli::resolve_config;
use crate::core::config::save_config;
use clap::Args;
use colored::*;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the configuration to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Prints the defaults, or the given config file after validation.
pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = resolve_config(config_path)?;

    match args.output {
        Some(path) => {
            save_config(&path, &config)?;
            eprintln!("{} {}", "Wrote".green().bold(), path.display());
        }
        None => print!("{}", toml::to_string_pretty(&config)?),
    }
    Ok(())
}
