pub mod bio;
pub mod cli;
pub mod core;
pub mod report;

pub use crate::bio::alignment::{AlignmentResult, DistanceModel, NeedlemanWunsch, ScoringConfig};
pub use crate::bio::sequence::{Alphabet, Sequence};
pub use crate::core::matrix::{AlignmentCache, DistanceMatrix, DistanceMatrixBuilder};
pub use crate::core::pipeline::{Pipeline, PipelineOutput};
pub use crate::core::wpgma::{Cluster, ClusterId, ClusterTree, WpgmaClusterer};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeqtreeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Internal consistency violated: {0}")]
    InternalConsistency(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SeqtreeError {
    /// True for every error a caller should report as "malformed input":
    /// unreadable or unparsable files, bad residues and too few sequences.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            SeqtreeError::Io(_)
                | SeqtreeError::Parse(_)
                | SeqtreeError::Input(_)
                | SeqtreeError::InsufficientData(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SeqtreeError>;
