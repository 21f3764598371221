use crate::bio::alignment::DetailedAlignment;
use crate::core::matrix::DistanceMatrix;
use crate::core::wpgma::ClusterTree;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub mod json;
pub mod text;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: ReportFormat,
    /// Digits after the decimal point for distances and heights
    pub precision: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            precision: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Csv,
    Json,
    Newick,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            "newick" | "nwk" => Ok(ReportFormat::Newick),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

pub struct ReportGenerator {
    options: ReportOptions,
}

impl ReportGenerator {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn matrix(&self, matrix: &DistanceMatrix) -> Result<String> {
        match self.options.format {
            ReportFormat::Text => Ok(text::matrix_table(matrix, self.options.precision)),
            ReportFormat::Csv => self.matrix_csv(matrix),
            ReportFormat::Json => json::matrix_json(matrix),
            ReportFormat::Newick => bail!("a distance matrix has no Newick form"),
        }
    }

    pub fn tree(&self, tree: &ClusterTree) -> Result<String> {
        match self.options.format {
            ReportFormat::Text => text::tree_report(tree, self.options.precision),
            ReportFormat::Csv => self.merges_csv(tree),
            ReportFormat::Json => json::tree_json(tree),
            ReportFormat::Newick => Ok(format!("{}\n", tree.to_newick())),
        }
    }

    pub fn alignment(&self, alignment: &DetailedAlignment) -> Result<String> {
        match self.options.format {
            ReportFormat::Json => json::alignment_json(alignment),
            ReportFormat::Text => text::alignment_report(alignment, self.options.precision),
            other => bail!("alignments cannot be reported as {:?}", other),
        }
    }

    fn matrix_csv(&self, matrix: &DistanceMatrix) -> Result<String> {
        use std::fmt::Write;

        let mut output = String::new();
        let precision = self.options.precision;

        write!(&mut output, "id")?;
        for id in matrix.ids() {
            write!(&mut output, ",\"{}\"", id)?;
        }
        writeln!(&mut output)?;

        for (i, id) in matrix.ids().enumerate() {
            write!(&mut output, "\"{}\"", id)?;
            for j in 0..matrix.len() {
                write!(&mut output, ",{:.*}", precision, matrix.get(i, j))?;
            }
            writeln!(&mut output)?;
        }

        Ok(output)
    }

    fn merges_csv(&self, tree: &ClusterTree) -> Result<String> {
        use std::fmt::Write;

        let mut output = String::new();
        writeln!(&mut output, "Step,Cluster,Left,Right,Height,Leaves")?;
        for (step, cluster) in tree.merges().enumerate() {
            if let Some((left, right)) = cluster.children {
                writeln!(
                    &mut output,
                    "{},{},{},{},{:.*},{}",
                    step + 1,
                    cluster.id.0,
                    left.0,
                    right.0,
                    self.options.precision,
                    cluster.height,
                    cluster.leaf_count
                )?;
            }
        }
        Ok(output)
    }
}
