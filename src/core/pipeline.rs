//! parse output → distance matrix → WPGMA tree.

use crate::bio::alignment::NeedlemanWunsch;
use crate::bio::sequence::Sequence;
use crate::core::config::Config;
use crate::core::matrix::{index_sequences, AlignmentCache, DistanceMatrix, DistanceMatrixBuilder};
use crate::core::wpgma::{ClusterTree, WpgmaClusterer};
use crate::Result;
use indexmap::IndexMap;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Both artifacts of a run. Nothing partial is ever returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub matrix: DistanceMatrix,
    pub tree: ClusterTree,
}

#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    builder: DistanceMatrixBuilder,
    clusterer: WpgmaClusterer,
}

impl Pipeline {
    pub fn new(aligner: NeedlemanWunsch) -> Self {
        Self {
            builder: DistanceMatrixBuilder::new(aligner),
            clusterer: WpgmaClusterer::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.aligner()))
    }

    pub fn aligner(&self) -> &NeedlemanWunsch {
        self.builder.aligner()
    }

    pub fn run(&self, sequences: &IndexMap<String, Sequence>) -> Result<PipelineOutput> {
        self.run_inner(sequences, None)
    }

    pub fn run_with_cache(
        &self,
        sequences: &IndexMap<String, Sequence>,
        cache: &mut AlignmentCache,
    ) -> Result<PipelineOutput> {
        self.run_inner(sequences, Some(cache))
    }

    /// Convenience for parser output; duplicate identifiers are rejected.
    pub fn run_sequences(&self, sequences: Vec<Sequence>) -> Result<PipelineOutput> {
        self.run(&index_sequences(sequences)?)
    }

    fn run_inner(
        &self,
        sequences: &IndexMap<String, Sequence>,
        cache: Option<&mut AlignmentCache>,
    ) -> Result<PipelineOutput> {
        let start = Instant::now();

        let matrix = match cache {
            Some(cache) => self.builder.build_with_cache(sequences, cache)?,
            None => self.builder.build(sequences)?,
        };
        let tree = self.clusterer.cluster(&matrix)?;

        info!(
            "Pipeline finished: {} sequences, root height {} in {:.2?}",
            matrix.len(),
            tree.root_node().height,
            start.elapsed()
        );

        Ok(PipelineOutput { matrix, tree })
    }
}
