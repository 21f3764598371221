use crate::cli::{create_spinner, resolve_config, resolve_format, InputArgs};
use crate::core::matrix::{index_sequences, AlignmentCache, DistanceMatrixBuilder};
use crate::report::{ReportFormat, ReportGenerator, ReportOptions};
use clap::Args;
use colored::*;
use std::path::Path;

#[derive(Args)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format (text, csv, json)
    #[arg(long)]
    pub format: Option<ReportFormat>,
}

pub fn run(args: MatrixArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = resolve_config(config_path)?;
    args.input.apply(&mut config);
    config.validate()?;

    let sequences = index_sequences(args.input.read(&config)?)?;
    let pairs = sequences.len() * sequences.len().saturating_sub(1) / 2;

    let spinner = create_spinner(format!("Aligning {} pairs...", pairs));
    let builder = DistanceMatrixBuilder::new(config.aligner());
    let mut cache = AlignmentCache::new();
    let matrix = builder.build_with_cache(&sequences, &mut cache);
    spinner.finish_and_clear();
    let matrix = matrix?;

    let format = resolve_format(args.format, &config);
    if format == ReportFormat::Text {
        eprintln!(
            "{} {} sequences, {} distinct alignments",
            "Distance matrix:".green().bold(),
            matrix.len(),
            cache.misses()
        );
    }

    let generator = ReportGenerator::new(ReportOptions {
        format,
        precision: config.output.precision,
    });
    print!("{}", generator.matrix(&matrix)?);
    Ok(())
}
