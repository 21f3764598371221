pub mod distance;
pub mod nw_aligner;
pub mod scoring;

pub use distance::{DistanceConfig, DistanceModel};
pub use nw_aligner::{align, AlignmentResult, DetailedAlignment, NeedlemanWunsch};
pub use scoring::ScoringConfig;
