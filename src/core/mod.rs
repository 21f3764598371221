pub mod config;
pub mod matrix;
pub mod pipeline;
pub mod wpgma;

pub use config::Config;
pub use matrix::{AlignmentCache, DistanceMatrix, DistanceMatrixBuilder};
pub use pipeline::{Pipeline, PipelineOutput};
pub use wpgma::{ClusterTree, WpgmaClusterer};
