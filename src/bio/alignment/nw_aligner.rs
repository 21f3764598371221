//! Needleman-Wunsch global alignment algorithm

use crate::bio::alignment::distance::{score_deficit, DistanceConfig, GAP};
use crate::bio::alignment::scoring::ScoringConfig;
use crate::bio::sequence::{Alphabet, Sequence};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Score and distance for one aligned pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub first_id: String,
    pub second_id: String,
    pub score: i32,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailedAlignment {
    pub result: AlignmentResult,
    pub first_aligned: Vec<u8>,
    pub second_aligned: Vec<u8>,
    pub alignment_string: Vec<u8>, // '|' for match, 'X' for mismatch, ' ' for gap
    pub identity: f64,             // Matching columns over all columns (0.0 to 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Traceback {
    Diagonal,
    Up,
    Left,
    None,
}

/// Global aligner over a fixed scoring scheme, alphabet and distance model.
#[derive(Debug, Clone, Copy)]
pub struct NeedlemanWunsch {
    scoring: ScoringConfig,
    alphabet: Alphabet,
    distance: DistanceConfig,
}

impl NeedlemanWunsch {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self {
            scoring,
            alphabet: Alphabet::default(),
            distance: DistanceConfig::default(),
        }
    }

    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn with_distance(mut self, distance: DistanceConfig) -> Self {
        self.distance = distance;
        self
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn distance_config(&self) -> &DistanceConfig {
        &self.distance
    }

    /// Optimal global score and the induced distance.
    ///
    /// Both sequences are checked against the alphabet before any table is
    /// allocated. Score-only models run in linear memory.
    pub fn align(&self, first: &Sequence, second: &Sequence) -> Result<AlignmentResult> {
        self.check_inputs(first, second)?;

        if !self.distance.model.needs_traceback() {
            let score = self.score_only(&first.sequence, &second.sequence)?;
            return Ok(AlignmentResult {
                first_id: first.id.clone(),
                second_id: second.id.clone(),
                score,
                distance: score_deficit(
                    score,
                    self.scoring.match_score,
                    first.len(),
                    second.len(),
                ),
            });
        }

        Ok(self.align_checked(first, second).result)
    }

    /// Full alignment including the gapped rows.
    pub fn align_detailed(&self, first: &Sequence, second: &Sequence) -> Result<DetailedAlignment> {
        self.check_inputs(first, second)?;
        Ok(self.align_checked(first, second))
    }

    fn check_inputs(&self, first: &Sequence, second: &Sequence) -> Result<()> {
        self.alphabet.validate(first)?;
        self.alphabet.validate(second)?;
        self.scoring.check_range(first.len(), second.len())
    }

    fn align_checked(&self, first: &Sequence, second: &Sequence) -> DetailedAlignment {
        // Tie-breaking is direction-sensitive, so the pair is always filled in
        // the same orientation and the rows are swapped back afterwards.
        let swapped = first.sequence > second.sequence;
        let (a, b) = if swapped {
            (&second.sequence, &first.sequence)
        } else {
            (&first.sequence, &second.sequence)
        };

        let (score, a_aligned, b_aligned) = self.fill_and_trace(a, b);
        let (first_aligned, second_aligned) = if swapped {
            (b_aligned, a_aligned)
        } else {
            (a_aligned, b_aligned)
        };

        let alignment_string = self.calculate_alignment_string(&first_aligned, &second_aligned);
        let matches = alignment_string.iter().filter(|&&c| c == b'|').count();
        let identity = matches as f64 / alignment_string.len().max(1) as f64;
        let distance =
            self.distance
                .from_alignment(score, &self.scoring, &first_aligned, &second_aligned);

        DetailedAlignment {
            result: AlignmentResult {
                first_id: first.id.clone(),
                second_id: second.id.clone(),
                score,
                distance,
            },
            first_aligned,
            second_aligned,
            alignment_string,
            identity,
        }
    }

    fn fill_and_trace(&self, a: &[u8], b: &[u8]) -> (i32, Vec<u8>, Vec<u8>) {
        let rows = a.len();
        let cols = b.len();

        let mut score_matrix = vec![vec![0i32; cols + 1]; rows + 1];
        let mut traceback_matrix = vec![vec![Traceback::None; cols + 1]; rows + 1];

        self.initialize_matrices(&mut score_matrix, &mut traceback_matrix, rows, cols);
        self.fill_matrices(&mut score_matrix, &mut traceback_matrix, a, b);
        let (a_aligned, b_aligned) = self.traceback(&traceback_matrix, a, b);

        (score_matrix[rows][cols], a_aligned, b_aligned)
    }

    fn initialize_matrices(
        &self,
        score_matrix: &mut [Vec<i32>],
        traceback_matrix: &mut [Vec<Traceback>],
        rows: usize,
        cols: usize,
    ) {
        let gap = self.scoring.gap_open;

        for j in 1..=cols {
            score_matrix[0][j] = gap * j as i32;
            traceback_matrix[0][j] = Traceback::Left;
        }

        for i in 1..=rows {
            score_matrix[i][0] = gap * i as i32;
            traceback_matrix[i][0] = Traceback::Up;
        }
    }

    fn fill_matrices(
        &self,
        score_matrix: &mut [Vec<i32>],
        traceback_matrix: &mut [Vec<Traceback>],
        a: &[u8],
        b: &[u8],
    ) {
        let gap = self.scoring.gap_open;

        for i in 1..=a.len() {
            for j in 1..=b.len() {
                let diagonal_score = score_matrix[i - 1][j - 1] + self.scoring.score(a[i - 1], b[j - 1]);
                let up_score = score_matrix[i - 1][j] + gap;
                let left_score = score_matrix[i][j - 1] + gap;

                // Diagonal wins ties, then up, then left.
                let (best_score, direction) =
                    if diagonal_score >= up_score && diagonal_score >= left_score {
                        (diagonal_score, Traceback::Diagonal)
                    } else if up_score >= left_score {
                        (up_score, Traceback::Up)
                    } else {
                        (left_score, Traceback::Left)
                    };

                score_matrix[i][j] = best_score;
                traceback_matrix[i][j] = direction;
            }
        }
    }

    fn traceback(&self, traceback_matrix: &[Vec<Traceback>], a: &[u8], b: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut a_aligned = Vec::with_capacity(a.len() + b.len());
        let mut b_aligned = Vec::with_capacity(a.len() + b.len());

        let mut i = a.len();
        let mut j = b.len();

        while i > 0 || j > 0 {
            match traceback_matrix[i][j] {
                Traceback::Diagonal => {
                    a_aligned.push(a[i - 1]);
                    b_aligned.push(b[j - 1]);
                    i -= 1;
                    j -= 1;
                }
                Traceback::Up => {
                    a_aligned.push(a[i - 1]);
                    b_aligned.push(GAP);
                    i -= 1;
                }
                Traceback::Left => {
                    a_aligned.push(GAP);
                    b_aligned.push(b[j - 1]);
                    j -= 1;
                }
                Traceback::None => break,
            }
        }

        a_aligned.reverse();
        b_aligned.reverse();

        (a_aligned, b_aligned)
    }

    /// Optimal score with a single rolling row over the shorter sequence.
    pub fn score_only(&self, a: &[u8], b: &[u8]) -> Result<i32> {
        self.scoring.check_range(a.len(), b.len())?;
        let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        let gap = self.scoring.gap_open;

        let mut row: Vec<i32> = (0..=short.len()).map(|j| gap * j as i32).collect();
        for (i, &l) in long.iter().enumerate() {
            let mut diagonal = row[0];
            row[0] = gap * (i as i32 + 1);
            for (j, &s) in short.iter().enumerate() {
                let up = row[j + 1];
                let best = (diagonal + self.scoring.score(l, s))
                    .max(up + gap)
                    .max(row[j] + gap);
                diagonal = up;
                row[j + 1] = best;
            }
        }
        Ok(row[short.len()])
    }

    fn calculate_alignment_string(&self, first_aligned: &[u8], second_aligned: &[u8]) -> Vec<u8> {
        first_aligned
            .iter()
            .zip(second_aligned.iter())
            .map(|(&r, &q)| {
                if r == GAP || q == GAP {
                    b' '
                } else if r == q {
                    b'|'
                } else {
                    b'X'
                }
            })
            .collect()
    }
}

impl DetailedAlignment {
    pub fn score(&self) -> i32 {
        self.result.score
    }

    pub fn distance(&self) -> f64 {
        self.result.distance
    }

    pub fn len(&self) -> usize {
        self.first_aligned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_aligned.is_empty()
    }
}

/// Align two sequences over DNA with the default Jukes-Cantor distance.
pub fn align(first: &Sequence, second: &Sequence, scoring: &ScoringConfig) -> Result<AlignmentResult> {
    NeedlemanWunsch::new(*scoring).align(first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::alignment::distance::{ColumnCounts, DistanceModel};
    use crate::SeqtreeError;

    fn seq(id: &str, residues: &[u8]) -> Sequence {
        Sequence::new(id, residues.to_vec())
    }

    fn unit_scoring() -> ScoringConfig {
        ScoringConfig::new(1, -1, -2)
    }

    #[test]
    fn test_simple_alignment() {
        let aligner = NeedlemanWunsch::new(ScoringConfig::default());
        let result = aligner
            .align_detailed(&seq("r", b"ACGT"), &seq("q", b"AGGT"))
            .unwrap();

        assert_eq!(result.first_aligned, b"ACGT");
        assert_eq!(result.second_aligned, b"AGGT");
        assert_eq!(result.alignment_string, b"|X||");
        assert_eq!(result.score(), 5 - 2 + 5 + 5);
    }

    #[test]
    fn test_identical_sequences_score_all_matches() {
        let aligner = NeedlemanWunsch::new(unit_scoring());
        let result = aligner
            .align(&seq("a", b"GATTACA"), &seq("b", b"GATTACA"))
            .unwrap();
        assert_eq!(result.score, 7);
        assert_eq!(result.distance, 0.0);
    }

    #[test]
    fn test_alignment_with_gap() {
        let aligner = NeedlemanWunsch::new(ScoringConfig::default());
        let result = aligner
            .align_detailed(&seq("r", b"ACGTACGT"), &seq("q", b"ACGTCGT"))
            .unwrap();

        assert_eq!(result.first_aligned.len(), result.second_aligned.len());
        assert_eq!(result.second_aligned.iter().filter(|&&c| c == GAP).count(), 1);
        assert_eq!(result.score(), 7 * 5 - 6);
        // Gap columns are not comparable, so the remaining columns all match.
        assert_eq!(result.distance(), 0.0);
    }

    #[test]
    fn test_diagonal_preferred_on_tie() {
        let aligner = NeedlemanWunsch::new(ScoringConfig::new(1, -2, -1));
        let result = aligner.align_detailed(&seq("a", b"A"), &seq("b", b"T")).unwrap();
        // Mismatch (-2) ties with two gaps (-2): the diagonal wins.
        assert_eq!(result.score(), -2);
        assert_eq!(result.first_aligned, b"A");
        assert_eq!(result.second_aligned, b"T");
    }

    #[test]
    fn test_swapped_arguments_give_same_distance() {
        let aligner = NeedlemanWunsch::new(unit_scoring());
        let a = seq("a", b"ACGTTGCA");
        let b = seq("b", b"ACTTGGA");
        let ab = aligner.align_detailed(&a, &b).unwrap();
        let ba = aligner.align_detailed(&b, &a).unwrap();
        assert_eq!(ab.score(), ba.score());
        assert_eq!(ab.distance(), ba.distance());
        assert_eq!(ab.first_aligned, ba.second_aligned);
        assert_eq!(ab.result.first_id, "a");
        assert_eq!(ba.result.first_id, "b");
    }

    #[test]
    fn test_score_only_matches_full_table() {
        let aligner = NeedlemanWunsch::new(ScoringConfig::default());
        let pairs: [(&[u8], &[u8]); 4] = [
            (b"GATTACA", b"GCATGCT"),
            (b"A", b"ACGTACGT"),
            (b"ACGTACGTTT", b"TTACG"),
            (b"CCCC", b"CCCC"),
        ];
        for (a, b) in pairs {
            let full = aligner.align_detailed(&seq("a", a), &seq("b", b)).unwrap();
            assert_eq!(aligner.score_only(a, b).unwrap(), full.score(), "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_gap_and_mismatch_in_one_alignment() {
        let aligner = NeedlemanWunsch::new(unit_scoring());
        let result = aligner
            .align_detailed(&seq("a", b"ACGTAC"), &seq("b", b"ATGAC"))
            .unwrap();

        assert_eq!(result.score(), 1);
        assert_eq!(result.first_aligned, b"ACGTAC");
        assert_eq!(result.second_aligned, b"ATG-AC");
        assert_eq!(result.alignment_string, b"|X| ||");

        let counts = ColumnCounts::tally(&result.first_aligned, &result.second_aligned);
        assert_eq!(
            counts,
            ColumnCounts {
                comparable: 5,
                mismatches: 1,
                gaps: 1,
            }
        );
        // p = 1/5
        let expected = -0.75 * (1.0_f64 - 4.0 / 15.0).ln();
        assert!((result.distance() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_oversized_scores_are_rejected_not_overflowed() {
        let aligner = NeedlemanWunsch::new(ScoringConfig::new(2_000_000_000, -1, -2));
        let err = aligner.align(&seq("a", b"AA"), &seq("b", b"AA")).unwrap_err();
        assert!(matches!(err, SeqtreeError::Config(_)));

        let aligner = NeedlemanWunsch::new(ScoringConfig::new(1, -1, -2_000_000_000));
        assert!(aligner.align_detailed(&seq("a", b"AAA"), &seq("b", b"A")).is_err());
        assert!(aligner.score_only(b"AAA", b"A").is_err());
        let score_deficit = aligner.with_distance(DistanceConfig::new(DistanceModel::ScoreDeficit));
        assert!(score_deficit.align(&seq("a", b"AAA"), &seq("b", b"A")).is_err());
    }

    #[test]
    fn test_score_deficit_model_skips_traceback() {
        let aligner = NeedlemanWunsch::new(unit_scoring())
            .with_distance(DistanceConfig::new(DistanceModel::ScoreDeficit));
        let result = aligner.align(&seq("x", b"AAAA"), &seq("z", b"TTTT")).unwrap();
        assert_eq!(result.score, -4);
        assert_eq!(result.distance, 2.0);
    }

    #[test]
    fn test_rejects_empty_sequence() {
        let aligner = NeedlemanWunsch::new(unit_scoring());
        let err = aligner.align(&seq("a", b"ACGT"), &seq("b", b"")).unwrap_err();
        assert!(matches!(err, SeqtreeError::Input(_)));
    }

    #[test]
    fn test_rejects_symbol_outside_alphabet() {
        let aligner = NeedlemanWunsch::new(unit_scoring());
        let err = aligner.align(&seq("a", b"ACGU"), &seq("b", b"ACGT")).unwrap_err();
        assert!(matches!(err, SeqtreeError::Input(_)));

        let rna = aligner.with_alphabet(Alphabet::Rna);
        assert!(rna.align(&seq("a", b"ACGU"), &seq("b", b"ACGU")).is_ok());
    }

    #[test]
    fn test_free_function() {
        let result = align(&seq("a", b"AAAA"), &seq("b", b"AAAT"), &unit_scoring()).unwrap();
        assert_eq!(result.score, 2);
        assert!(result.distance > 0.0);
    }
}
