//! WPGMA agglomerative clustering.
//!
//! Clusters live in an arena and refer to their children by [`ClusterId`].
//! Leaves take handles `0..n` in matrix order; every merge appends a new
//! handle, so handle order is also merge-construction order.

use crate::core::matrix::DistanceMatrix;
use crate::{Result, SeqtreeError};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub usize);

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A leaf (one input identifier) or the merge of exactly two clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    /// Identifier of the input sequence, leaves only
    pub label: Option<String>,
    pub leaf_count: usize,
    /// Distance at which the merge happened; 0 for leaves
    pub height: f64,
    pub children: Option<(ClusterId, ClusterId)>,
}

impl Cluster {
    fn leaf(id: ClusterId, label: &str) -> Self {
        Self {
            id,
            label: Some(label.to_string()),
            leaf_count: 1,
            height: 0.0,
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// The finished dendrogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterTree {
    nodes: Vec<Cluster>,
    root: ClusterId,
    leaves: usize,
}

impl ClusterTree {
    pub fn root(&self) -> ClusterId {
        self.root
    }

    pub fn root_node(&self) -> &Cluster {
        &self.nodes[self.root.0]
    }

    pub fn node(&self, id: ClusterId) -> Option<&Cluster> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[Cluster] {
        &self.nodes
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves
    }

    /// Internal nodes in the order they were merged.
    pub fn merges(&self) -> impl Iterator<Item = &Cluster> {
        self.nodes[self.leaves..].iter()
    }

    pub fn merge_heights(&self) -> Vec<f64> {
        self.merges().map(|c| c.height).collect()
    }

    /// Leaf labels under `id`, left to right.
    pub fn leaf_labels(&self, id: ClusterId) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            match node.children {
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => labels.extend(node.label.as_deref()),
            }
        }
        labels
    }

    /// Newick rendering of the ultrametric tree: a node sits at half its
    /// merge height, so each branch spans half the height difference.
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        self.write_newick(self.root, &mut out);
        out.push(';');
        out
    }

    fn write_newick(&self, id: ClusterId, out: &mut String) {
        let node = &self.nodes[id.0];
        match node.children {
            Some((left, right)) => {
                out.push('(');
                for (i, child) in [left, right].into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_newick(child, out);
                    let branch = (node.height - self.nodes[child.0].height) / 2.0;
                    let _ = write!(out, ":{}", branch);
                }
                out.push(')');
            }
            None => out.push_str(&newick_label(node.label.as_deref().unwrap_or(""))),
        }
    }
}

fn newick_label(label: &str) -> String {
    let needs_quotes = label
        .chars()
        .any(|c| c.is_whitespace() || "()[]':;,".contains(c));
    if needs_quotes {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

/// Weighted Pair Group Method with Arithmetic mean.
///
/// The distance from a merged cluster to any other cluster is the plain
/// mean of its two children's distances, whatever their sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WpgmaClusterer;

impl WpgmaClusterer {
    pub fn new() -> Self {
        Self
    }

    pub fn cluster(&self, matrix: &DistanceMatrix) -> Result<ClusterTree> {
        let n = matrix.len();
        if n < 2 {
            return Err(SeqtreeError::InsufficientData(format!(
                "clustering needs at least 2 identifiers, got {}",
                n
            )));
        }

        info!("Clustering {} identifiers with WPGMA", n);

        let capacity = 2 * n - 1;
        let mut nodes: Vec<Cluster> = Vec::with_capacity(capacity);
        for (i, label) in matrix.ids().enumerate() {
            nodes.push(Cluster::leaf(ClusterId(i), label));
        }

        // A merged cluster takes over the slot of its left child, so the
        // working table never grows past the input's condensed triangle.
        let mut table = WorkingTable::from_matrix(matrix);
        let mut slot_of: Vec<usize> = (0..n).collect();
        slot_of.reserve(n - 1);

        // Always sorted ascending: new handles are appended and exceed all others.
        let mut active: Vec<ClusterId> = (0..n).map(ClusterId).collect();
        let mut last_height = 0.0_f64;

        while active.len() > 1 {
            let (a, b, height) = closest_pair(&active, &slot_of, &table);

            check_monotone(last_height, height, a, b)?;
            last_height = height;

            let merged = ClusterId(nodes.len());
            let (slot_a, slot_b) = (slot_of[a.0], slot_of[b.0]);
            for &k in active.iter().filter(|&&k| k != a && k != b) {
                let slot_k = slot_of[k.0];
                let d = (table.get(slot_a, slot_k) + table.get(slot_b, slot_k)) / 2.0;
                table.set(slot_a, slot_k, d);
            }
            slot_of.push(slot_a);

            let leaf_count = nodes[a.0].leaf_count + nodes[b.0].leaf_count;
            debug!(
                "Merged {} and {} into {} at height {} ({} leaves)",
                a, b, merged, height, leaf_count
            );
            nodes.push(Cluster {
                id: merged,
                label: None,
                leaf_count,
                height,
                children: Some((a, b)),
            });

            active.retain(|&k| k != a && k != b);
            active.push(merged);
        }

        let root = active[0];
        if nodes[root.0].leaf_count != n || nodes.len() != capacity {
            return Err(SeqtreeError::InternalConsistency(format!(
                "root {} covers {} of {} leaves",
                root, nodes[root.0].leaf_count, n
            )));
        }

        Ok(ClusterTree {
            nodes,
            root,
            leaves: n,
        })
    }
}

/// Merge heights never decrease.
fn check_monotone(previous: f64, height: f64, a: ClusterId, b: ClusterId) -> Result<()> {
    if height < previous {
        return Err(SeqtreeError::InternalConsistency(format!(
            "merge height {} of {} and {} is below the previous height {}",
            height, a, b, previous
        )));
    }
    Ok(())
}

/// Minimum-distance pair among active clusters. Scanning in ascending handle
/// order with a strict comparison keeps the lexicographically smallest pair
/// on ties.
fn closest_pair(
    active: &[ClusterId],
    slot_of: &[usize],
    table: &WorkingTable,
) -> (ClusterId, ClusterId, f64) {
    let mut best = (active[0], active[1], f64::INFINITY);
    for (i, &a) in active.iter().enumerate() {
        for &b in &active[i + 1..] {
            let d = table.get(slot_of[a.0], slot_of[b.0]);
            if d < best.2 {
                best = (a, b, d);
            }
        }
    }
    best
}

/// Condensed upper triangle over `n` slots.
struct WorkingTable {
    n: usize,
    cells: Vec<f64>,
}

impl WorkingTable {
    fn from_matrix(matrix: &DistanceMatrix) -> Self {
        Self {
            n: matrix.len(),
            cells: matrix.pairs().map(|(_, _, d)| d).collect(),
        }
    }

    fn index(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        i * self.n - i * (i + 1) / 2 + (j - i - 1)
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[self.index(i, j)]
    }

    fn set(&mut self, i: usize, j: usize, d: f64) {
        let index = self.index(i, j);
        self.cells[index] = d;
    }
}

/// Cluster a matrix with WPGMA.
pub fn cluster(matrix: &DistanceMatrix) -> Result<ClusterTree> {
    WpgmaClusterer::new().cluster(matrix)
}
