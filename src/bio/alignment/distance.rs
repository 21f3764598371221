//! Transforms from an alignment to a scalar distance.
//!
//! Every model maps identical sequences to `0.0` and never goes negative.
//! `JukesCantor` and `PDistance` read the gapped alignment; `ScoreDeficit`
//! only needs the optimal score.

use super::scoring::ScoringConfig;
use crate::{Result, SeqtreeError};
use serde::{Deserialize, Serialize};

pub const GAP: u8 = b'-';

/// Distance reported once the Jukes-Cantor correction diverges.
pub const DEFAULT_SATURATION: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceModel {
    /// `-3/4 ln(1 - 4p/3)` over gap-free columns.
    #[default]
    JukesCantor,
    /// Fraction of mismatching gap-free columns.
    PDistance,
    /// Shortfall from an all-match score, per column of the longer sequence.
    ScoreDeficit,
}

impl DistanceModel {
    pub fn needs_traceback(&self) -> bool {
        !matches!(self, DistanceModel::ScoreDeficit)
    }
}

impl std::fmt::Display for DistanceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DistanceModel::JukesCantor => "jukes-cantor",
            DistanceModel::PDistance => "p-distance",
            DistanceModel::ScoreDeficit => "score-deficit",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for DistanceModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jukes-cantor" | "jc" | "jc69" => Ok(DistanceModel::JukesCantor),
            "p-distance" | "p" => Ok(DistanceModel::PDistance),
            "score-deficit" | "score" => Ok(DistanceModel::ScoreDeficit),
            _ => Err(format!("Unknown distance model: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    pub model: DistanceModel,
    pub saturation: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            model: DistanceModel::default(),
            saturation: DEFAULT_SATURATION,
        }
    }
}

impl DistanceConfig {
    pub fn new(model: DistanceModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.saturation.is_finite() || self.saturation <= 0.0 {
            return Err(SeqtreeError::Config(format!(
                "saturation distance must be a positive finite number, got {}",
                self.saturation
            )));
        }
        Ok(())
    }

    /// Distance from a gapped alignment (rows of equal length) and its score.
    pub fn from_alignment(
        &self,
        score: i32,
        scoring: &ScoringConfig,
        first: &[u8],
        second: &[u8],
    ) -> f64 {
        match self.model {
            DistanceModel::JukesCantor => {
                jukes_cantor(&ColumnCounts::tally(first, second), self.saturation)
            }
            DistanceModel::PDistance => ColumnCounts::tally(first, second)
                .p_distance()
                .unwrap_or(1.0),
            DistanceModel::ScoreDeficit => score_deficit(
                score,
                scoring.match_score,
                residue_count(first),
                residue_count(second),
            ),
        }
    }
}

fn residue_count(row: &[u8]) -> usize {
    row.iter().filter(|&&c| c != GAP).count()
}

/// Column classes of a pairwise alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnCounts {
    pub comparable: usize,
    pub mismatches: usize,
    pub gaps: usize,
}

impl ColumnCounts {
    pub fn tally(first: &[u8], second: &[u8]) -> Self {
        let mut counts = Self::default();
        for (&a, &b) in first.iter().zip(second) {
            if a == GAP || b == GAP {
                counts.gaps += 1;
                continue;
            }
            counts.comparable += 1;
            if a != b {
                counts.mismatches += 1;
            }
        }
        counts
    }

    /// `None` when every column holds a gap.
    pub fn p_distance(&self) -> Option<f64> {
        if self.comparable == 0 {
            None
        } else {
            Some(self.mismatches as f64 / self.comparable as f64)
        }
    }
}

/// Jukes-Cantor corrected distance, saturating where the log diverges
/// (`p >= 0.75`) or no column is comparable.
pub fn jukes_cantor(counts: &ColumnCounts, saturation: f64) -> f64 {
    let Some(p) = counts.p_distance() else {
        return saturation;
    };
    if p == 0.0 {
        return 0.0;
    }
    if p >= 0.75 {
        return saturation;
    }
    let correction = 1.0 - (4.0 / 3.0) * p;
    (-0.75 * correction.ln()).min(saturation)
}

/// `(match * L - score) / L` with `L` the longer sequence length.
pub fn score_deficit(score: i32, match_score: i32, first_len: usize, second_len: usize) -> f64 {
    let longest = first_len.max(second_len).max(1) as f64;
    let best = match_score as f64 * longest;
    ((best - score as f64) / longest).max(0.0)
}
