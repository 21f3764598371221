//! All-pairs distance matrix over a sequence collection.

use crate::bio::alignment::{DistanceModel, NeedlemanWunsch, ScoringConfig};
use crate::bio::sequence::{Alphabet, Sequence};
use crate::{Result, SeqtreeError};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, trace};

/// Symmetric, zero-diagonal distance matrix.
///
/// Only the strict upper triangle is stored, so `get(i, j)` and `get(j, i)`
/// read the same cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    ids: IndexSet<String>,
    condensed: Vec<f64>,
}

impl DistanceMatrix {
    fn from_condensed(ids: IndexSet<String>, condensed: Vec<f64>) -> Self {
        debug_assert_eq!(condensed.len(), ids.len() * ids.len().saturating_sub(1) / 2);
        Self { ids, condensed }
    }

    /// Build from a full square matrix supplied by the caller.
    ///
    /// Rejects duplicate identifiers, ragged rows, a non-zero diagonal,
    /// asymmetric cells and negative or non-finite distances.
    pub fn from_rows(ids: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let n = ids.len();
        let id_set: IndexSet<String> = ids.into_iter().collect();
        if id_set.len() != n {
            return Err(SeqtreeError::Input("duplicate identifiers in matrix".into()));
        }
        if rows.len() != n || rows.iter().any(|row| row.len() != n) {
            return Err(SeqtreeError::Input(format!(
                "distance matrix must be {}x{}",
                n, n
            )));
        }

        let mut condensed = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            if rows[i][i] != 0.0 {
                return Err(SeqtreeError::Input(format!(
                    "diagonal entry for '{}' is {}, expected 0",
                    id_set[i], rows[i][i]
                )));
            }
            for j in (i + 1)..n {
                let d = rows[i][j];
                if !d.is_finite() || d < 0.0 {
                    return Err(SeqtreeError::Input(format!(
                        "distance between '{}' and '{}' must be finite and non-negative, got {}",
                        id_set[i], id_set[j], d
                    )));
                }
                if d != rows[j][i] {
                    return Err(SeqtreeError::Input(format!(
                        "distance matrix is not symmetric at ('{}', '{}')",
                        id_set[i], id_set[j]
                    )));
                }
                condensed.push(d);
            }
        }

        Ok(Self::from_condensed(id_set, condensed))
    }

    /// Number of identifiers covered.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl ExactSizeIterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn id(&self, index: usize) -> Option<&str> {
        self.ids.get_index(index).map(String::as_str)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.get_index_of(id)
    }

    fn condensed_index(&self, i: usize, j: usize) -> usize {
        let n = self.ids.len();
        i * n - i * (i + 1) / 2 + (j - i - 1)
    }

    /// Distance by position. Panics if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.len() && j < self.len(), "matrix index out of range");
        match i.cmp(&j) {
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Less => self.condensed[self.condensed_index(i, j)],
            std::cmp::Ordering::Greater => self.condensed[self.condensed_index(j, i)],
        }
    }

    /// Distance by identifier, `None` if either is unknown.
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.get(self.index_of(a)?, self.index_of(b)?))
    }

    /// Every unordered pair `(i, j, d)` with `i < j`, row-major.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.len();
        (0..n)
            .flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
            .zip(self.condensed.iter().copied())
            .map(|((i, j), d)| (i, j, d))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let n = self.len();
        (0..n).map(|i| (0..n).map(|j| self.get(i, j)).collect()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    scoring: ScoringConfig,
    alphabet: Alphabet,
    model: DistanceModel,
    saturation_bits: u64,
    first: Vec<u8>,
    second: Vec<u8>,
}

impl CacheKey {
    fn new(aligner: &NeedlemanWunsch, a: &[u8], b: &[u8]) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let distance = aligner.distance_config();
        Self {
            scoring: *aligner.scoring(),
            alphabet: aligner.alphabet(),
            model: distance.model,
            saturation_bits: distance.saturation.to_bits(),
            first: first.to_vec(),
            second: second.to_vec(),
        }
    }
}

/// Caller-owned memo of pairwise distances.
///
/// Entries are keyed by the full aligner settings and the residue pair in
/// canonical order, so one cache may be shared across runs with different
/// settings without returning stale values.
#[derive(Debug, Default)]
pub struct AlignmentCache {
    entries: HashMap<CacheKey, f64>,
    hits: usize,
    misses: usize,
}

impl AlignmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    fn distance_for(
        &mut self,
        aligner: &NeedlemanWunsch,
        a: &Sequence,
        b: &Sequence,
    ) -> Result<f64> {
        let key = CacheKey::new(aligner, &a.sequence, &b.sequence);
        if let Some(&d) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(d);
        }
        let d = aligner.align(a, b)?.distance;
        self.misses += 1;
        self.entries.insert(key, d);
        Ok(d)
    }
}

/// Index a list of sequences by identifier, preserving order.
pub fn index_sequences(sequences: Vec<Sequence>) -> Result<IndexMap<String, Sequence>> {
    let mut indexed = IndexMap::with_capacity(sequences.len());
    for seq in sequences {
        if indexed.contains_key(&seq.id) {
            return Err(SeqtreeError::Input(format!(
                "duplicate sequence identifier '{}'",
                seq.id
            )));
        }
        indexed.insert(seq.id.clone(), seq);
    }
    Ok(indexed)
}

/// Aligns every unordered pair once and assembles the distance matrix.
#[derive(Debug, Clone, Copy)]
pub struct DistanceMatrixBuilder {
    aligner: NeedlemanWunsch,
}

impl DistanceMatrixBuilder {
    pub fn new(aligner: NeedlemanWunsch) -> Self {
        Self { aligner }
    }

    pub fn aligner(&self) -> &NeedlemanWunsch {
        &self.aligner
    }

    /// Identifier order follows the mapping's insertion order.
    pub fn build(&self, sequences: &IndexMap<String, Sequence>) -> Result<DistanceMatrix> {
        self.build_inner(sequences, None)
    }

    pub fn build_with_cache(
        &self,
        sequences: &IndexMap<String, Sequence>,
        cache: &mut AlignmentCache,
    ) -> Result<DistanceMatrix> {
        self.build_inner(sequences, Some(cache))
    }

    pub fn build_from_sequences(&self, sequences: Vec<Sequence>) -> Result<DistanceMatrix> {
        self.build(&index_sequences(sequences)?)
    }

    fn build_inner(
        &self,
        sequences: &IndexMap<String, Sequence>,
        mut cache: Option<&mut AlignmentCache>,
    ) -> Result<DistanceMatrix> {
        let n = sequences.len();
        if n < 2 {
            return Err(SeqtreeError::InsufficientData(format!(
                "a distance matrix needs at least 2 sequences, got {}",
                n
            )));
        }

        let total_pairs = n * (n - 1) / 2;
        info!(
            "Building distance matrix for {} sequences ({} pairs, {} distance)",
            n,
            total_pairs,
            self.aligner.distance_config().model
        );

        let entries: Vec<(&String, &Sequence)> = sequences.iter().collect();
        let mut condensed = Vec::with_capacity(total_pairs);

        for (i, &(id_a, seq_a)) in entries.iter().enumerate() {
            for &(id_b, seq_b) in &entries[i + 1..] {
                let distance = match cache.as_deref_mut() {
                    Some(cache) => cache.distance_for(&self.aligner, seq_a, seq_b),
                    None => self.aligner.align(seq_a, seq_b).map(|r| r.distance),
                }
                .map_err(|e| annotate(e, id_a, id_b))?;

                trace!("d({}, {}) = {}", id_a, id_b, distance);
                condensed.push(distance);
            }
        }

        if let Some(cache) = cache {
            debug!(
                "Alignment cache: {} hits, {} misses, {} entries",
                cache.hits(),
                cache.misses(),
                cache.len()
            );
        }

        let ids: IndexSet<String> = sequences.keys().cloned().collect();
        Ok(DistanceMatrix::from_condensed(ids, condensed))
    }
}

fn annotate(err: SeqtreeError, a: &str, b: &str) -> SeqtreeError {
    match err {
        SeqtreeError::Input(msg) => {
            SeqtreeError::Input(format!("while aligning '{}' with '{}': {}", a, b, msg))
        }
        other => other,
    }
}
