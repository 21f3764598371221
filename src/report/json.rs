use crate::bio::alignment::DetailedAlignment;
use crate::core::matrix::DistanceMatrix;
use crate::core::wpgma::ClusterTree;
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct MatrixView<'a> {
    ids: Vec<&'a str>,
    distances: Vec<Vec<f64>>,
}

#[derive(Serialize)]
struct TreeView<'a> {
    newick: String,
    root: usize,
    nodes: &'a [crate::core::wpgma::Cluster],
}

#[derive(Serialize)]
struct AlignmentView<'a> {
    first_id: &'a str,
    second_id: &'a str,
    score: i32,
    distance: f64,
    identity: f64,
    first_aligned: String,
    second_aligned: String,
}

pub fn matrix_json(matrix: &DistanceMatrix) -> Result<String> {
    let view = MatrixView {
        ids: matrix.ids().collect(),
        distances: matrix.to_rows(),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

pub fn tree_json(tree: &ClusterTree) -> Result<String> {
    let view = TreeView {
        newick: tree.to_newick(),
        root: tree.root().0,
        nodes: tree.nodes(),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

pub fn alignment_json(alignment: &DetailedAlignment) -> Result<String> {
    let view = AlignmentView {
        first_id: &alignment.result.first_id,
        second_id: &alignment.result.second_id,
        score: alignment.score(),
        distance: alignment.distance(),
        identity: alignment.identity,
        first_aligned: String::from_utf8_lossy(&alignment.first_aligned).into_owned(),
        second_aligned: String::from_utf8_lossy(&alignment.second_aligned).into_owned(),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}
