use crate::cli::{create_spinner, resolve_config, resolve_format, InputArgs};
use crate::core::pipeline::Pipeline;
use crate::report::{ReportFormat, ReportGenerator, ReportOptions};
use clap::Args;
use colored::*;
use std::path::Path;

#[derive(Args)]
pub struct ClusterArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format (text, csv, json, newick)
    #[arg(long)]
    pub format: Option<ReportFormat>,

    /// Also print the distance matrix before the tree
    #[arg(long)]
    pub with_matrix: bool,
}

pub fn run(args: ClusterArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = resolve_config(config_path)?;
    args.input.apply(&mut config);
    let pipeline = Pipeline::from_config(&config)?;

    let sequences = args.input.read(&config)?;

    let spinner = create_spinner(format!("Clustering {} sequences...", sequences.len()));
    let output = pipeline.run_sequences(sequences);
    spinner.finish_and_clear();
    let output = output?;

    let format = resolve_format(args.format, &config);
    if format == ReportFormat::Text {
        eprintln!(
            "{} {} leaves, root at {:.*}",
            "WPGMA tree:".green().bold(),
            output.tree.leaf_count(),
            config.output.precision,
            output.tree.root_node().height
        );
    }

    let generator = ReportGenerator::new(ReportOptions {
        format,
        precision: config.output.precision,
    });
    if args.with_matrix && format != ReportFormat::Newick {
        print!("{}", generator.matrix(&output.matrix)?);
        println!();
    }
    print!("{}", generator.tree(&output.tree)?);
    Ok(())
}
