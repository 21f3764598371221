//! Scoring configuration for global alignment

use crate::{Result, SeqtreeError};
use serde::{Deserialize, Serialize};

/// Linear-gap scoring scheme.
///
/// All three values are added to the running score, so penalties are
/// negative: the classic configuration is `{ match: 1, mismatch: -1, gap: -2 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    #[serde(rename = "match")]
    pub match_score: i32,
    pub mismatch: i32,
    pub gap_open: i32,
}

impl ScoringConfig {
    pub fn new(match_score: i32, mismatch: i32, gap_open: i32) -> Self {
        Self {
            match_score,
            mismatch,
            gap_open,
        }
    }

    pub fn with_scores(mut self, match_score: i32, mismatch: i32) -> Self {
        self.match_score = match_score;
        self.mismatch = mismatch;
        self
    }

    pub fn with_gap_penalty(mut self, gap_open: i32) -> Self {
        self.gap_open = gap_open;
        self
    }

    /// Substitution score for a pair of residues.
    #[inline]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_score
        } else {
            self.mismatch
        }
    }

    /// The distance transforms rely on a match being the best thing that can
    /// happen to a column, so the scheme must reward matches and never reward gaps.
    pub fn validate(&self) -> Result<()> {
        if self.match_score <= 0 {
            return Err(SeqtreeError::Config(format!(
                "match score must be positive, got {}",
                self.match_score
            )));
        }
        if self.mismatch >= self.match_score {
            return Err(SeqtreeError::Config(format!(
                "mismatch score {} must be lower than match score {}",
                self.mismatch, self.match_score
            )));
        }
        if self.gap_open > 0 {
            return Err(SeqtreeError::Config(format!(
                "gap penalty must be zero or negative, got {}",
                self.gap_open
            )));
        }
        Ok(())
    }

    /// No cell of the table can exceed `max |score| * (len_a + len_b)` in
    /// magnitude, so the fill stays within `i32` whenever that bound does.
    pub fn check_range(&self, first_len: usize, second_len: usize) -> Result<()> {
        let largest = [self.match_score, self.mismatch, self.gap_open]
            .iter()
            .map(|v| u64::from(v.unsigned_abs()))
            .max()
            .unwrap_or(0);
        let steps = (first_len as u64).saturating_add(second_len as u64);
        let bound = largest.saturating_mul(steps);
        if bound > i32::MAX as u64 {
            return Err(SeqtreeError::Config(format!(
                "scores up to {} over {} + {} residues overflow the alignment table",
                largest, first_len, second_len
            )));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            match_score: 5,
            mismatch: -2,
            gap_open: -6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scores() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.score(b'A', b'A'), 5);
        assert_eq!(scoring.score(b'A', b'C'), -2);
        assert_eq!(scoring.gap_open, -6);
        assert!(scoring.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let scoring = ScoringConfig::default()
            .with_scores(1, -1)
            .with_gap_penalty(-2);
        assert_eq!(scoring, ScoringConfig::new(1, -1, -2));
    }

    #[test]
    fn test_rejects_inverted_scheme() {
        assert!(ScoringConfig::new(0, -1, -2).validate().is_err());
        assert!(ScoringConfig::new(1, 2, -2).validate().is_err());
        assert!(ScoringConfig::new(1, -1, 3).validate().is_err());
    }

    #[test]
    fn test_range_check_rejects_huge_scores() {
        assert!(ScoringConfig::default().check_range(10_000, 10_000).is_ok());
        assert!(matches!(
            ScoringConfig::new(2_000_000_000, -1, -2).check_range(2, 2),
            Err(SeqtreeError::Config(_))
        ));
        assert!(ScoringConfig::new(1, -1, i32::MIN).check_range(1, 1).is_err());
    }

    #[test]
    fn test_toml_uses_match_key() {
        let scoring: ScoringConfig = toml::from_str("match = 1\nmismatch = -1\ngap_open = -2\n").unwrap();
        assert_eq!(scoring, ScoringConfig::new(1, -1, -2));
    }
}
