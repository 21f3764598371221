use crate::bio::fasta::{normalize_label, InputFormat};
use crate::cli::{resolve_config, resolve_format, InputArgs};
use crate::core::matrix::index_sequences;
use crate::report::{ReportFormat, ReportGenerator, ReportOptions};
use crate::SeqtreeError;
use clap::Args;
use std::path::Path;

#[derive(Args)]
pub struct AlignArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Identifier of the first sequence
    #[arg(long)]
    pub first: String,

    /// Identifier of the second sequence
    #[arg(long)]
    pub second: String,

    /// Output format (text, json)
    #[arg(long)]
    pub format: Option<ReportFormat>,
}

pub fn run(args: AlignArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = resolve_config(config_path)?;
    args.input.apply(&mut config);
    config.validate()?;

    let sequences = index_sequences(args.input.read(&config)?)?;
    let labelled = config.sequences.format == InputFormat::Labelled;
    let lookup = |id: &str| {
        sequences
            .get(id)
            .or_else(|| labelled.then(|| sequences.get(&normalize_label(id))).flatten())
            .ok_or_else(|| SeqtreeError::Input(format!("no sequence labelled '{}'", id)))
    };
    let first = lookup(&args.first)?;
    let second = lookup(&args.second)?;

    let alignment = config.aligner().align_detailed(first, second)?;

    let generator = ReportGenerator::new(ReportOptions {
        format: resolve_format(args.format, &config),
        precision: config.output.precision,
    });
    print!("{}", generator.alignment(&alignment)?);
    Ok(())
}
