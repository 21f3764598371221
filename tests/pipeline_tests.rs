//! End-to-end runs: sequences → distance matrix → WPGMA tree.

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use seqtree::bio::alignment::{DistanceConfig, DistanceModel};
use seqtree::core::config::default_config;
use seqtree::{
    AlignmentCache, ClusterId, DistanceMatrixBuilder, NeedlemanWunsch, Pipeline, ScoringConfig,
    Sequence, SeqtreeError, WpgmaClusterer,
};

fn classic() -> Pipeline {
    Pipeline::new(NeedlemanWunsch::new(ScoringConfig::new(1, -1, -2)))
}

fn collection(items: &[(&str, &str)]) -> IndexMap<String, Sequence> {
    items
        .iter()
        .map(|(id, s)| (id.to_string(), Sequence::new(*id, s.as_bytes().to_vec())))
        .collect()
}

#[test]
fn test_three_sequence_scenario() {
    let output = classic()
        .run(&collection(&[("X", "AAAA"), ("Y", "AAAT"), ("Z", "TTTT")]))
        .unwrap();

    let matrix = &output.matrix;
    assert_eq!(matrix.ids().collect::<Vec<_>>(), vec!["X", "Y", "Z"]);
    let xy = matrix.distance("X", "Y").unwrap();
    assert!((xy - 0.304_098_8).abs() < 1e-6);
    assert_eq!(matrix.distance("X", "Z"), Some(30.0));
    assert_eq!(matrix.distance("Z", "Y"), Some(30.0));

    let tree = &output.tree;
    let first = tree.merges().next().unwrap();
    assert_eq!(first.children, Some((ClusterId(0), ClusterId(1))));
    assert_eq!(first.height, xy);
    assert_eq!(tree.root_node().height, 30.0);
    assert_eq!(tree.root_node().leaf_count, 3);
    assert_eq!(tree.leaf_labels(tree.root()), vec!["Z", "X", "Y"]);
}

#[test]
fn test_identical_pair_merges_at_zero() {
    let output = classic()
        .run(&collection(&[("a", "GATTACA"), ("b", "GATTACA")]))
        .unwrap();
    assert_eq!(output.matrix.get(0, 1), 0.0);
    assert_eq!(output.tree.merge_heights(), vec![0.0]);
    assert_eq!(output.tree.to_newick(), "(a:0,b:0);");
}

#[test]
fn test_runs_are_deterministic() {
    let input = collection(&[
        ("s1", "ACGTACGTAA"),
        ("s2", "ACGTACGTTT"),
        ("s3", "TTGCACGTAA"),
        ("s4", "ACGAACGTAA"),
        ("s5", "GGGGCCCCAA"),
    ]);
    let pipeline = Pipeline::from_config(&default_config()).unwrap();
    let first = pipeline.run(&input).unwrap();
    let second = pipeline.run(&input).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.tree.to_newick(), second.tree.to_newick());
}

#[test]
fn test_single_sequence_is_insufficient() {
    let err = classic().run(&collection(&[("only", "ACGT")])).unwrap_err();
    assert!(matches!(err, SeqtreeError::InsufficientData(_)));
    assert!(err.is_malformed_input());
}

#[test]
fn test_bad_symbol_names_the_pair() {
    let err = classic()
        .run(&collection(&[("good", "ACGT"), ("bad", "ACXT")]))
        .unwrap_err();
    match err {
        SeqtreeError::Input(msg) => {
            assert!(msg.contains("'good'"));
            assert!(msg.contains("'bad'"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_identifiers_are_rejected() {
    let err = classic()
        .run_sequences(vec![
            Sequence::new("a", b"ACGT".to_vec()),
            Sequence::new("a", b"ACGA".to_vec()),
        ])
        .unwrap_err();
    assert!(matches!(err, SeqtreeError::Input(_)));
}

#[test]
fn test_cache_reuses_alignments_across_runs() {
    let input = collection(&[("a", "ACGT"), ("b", "ACGA"), ("c", "TCGA")]);
    let pipeline = classic();
    let mut cache = AlignmentCache::new();

    let cold = pipeline.run_with_cache(&input, &mut cache).unwrap();
    assert_eq!((cache.hits(), cache.misses()), (0, 3));

    let warm = pipeline.run_with_cache(&input, &mut cache).unwrap();
    assert_eq!((cache.hits(), cache.misses()), (3, 3));
    assert_eq!(cold, warm);
}

#[test]
fn test_cache_separates_distance_models() {
    let input = collection(&[("a", "ACGT"), ("b", "ACGA")]);
    let mut cache = AlignmentCache::new();
    let aligner = NeedlemanWunsch::new(ScoringConfig::new(1, -1, -2));

    let jc = DistanceMatrixBuilder::new(aligner)
        .build_with_cache(&input, &mut cache)
        .unwrap();
    let p = DistanceMatrixBuilder::new(aligner.with_distance(DistanceConfig::new(DistanceModel::PDistance)))
        .build_with_cache(&input, &mut cache)
        .unwrap();

    assert_eq!(cache.len(), 2);
    assert_eq!(p.get(0, 1), 0.25);
    assert!(jc.get(0, 1) > p.get(0, 1));
}

fn dna_collection() -> impl Strategy<Value = Vec<String>> {
    let residue = prop::sample::select(vec![b'A', b'C', b'G', b'T']);
    let sequence = proptest::collection::vec(residue, 1..16)
        .prop_map(|bytes| String::from_utf8(bytes).unwrap_or_default());
    proptest::collection::vec(sequence, 2..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_matrix_and_tree_invariants(seqs in dna_collection()) {
        let input: IndexMap<String, Sequence> = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let id = format!("s{}", i);
                (id.clone(), Sequence::new(id, s.as_bytes().to_vec()))
            })
            .collect();
        let output = classic().run(&input).unwrap();
        let n = input.len();

        for i in 0..n {
            prop_assert_eq!(output.matrix.get(i, i), 0.0);
            for j in 0..n {
                prop_assert_eq!(output.matrix.get(i, j), output.matrix.get(j, i));
                prop_assert!(output.matrix.get(i, j) >= 0.0);
            }
        }

        let heights = output.tree.merge_heights();
        prop_assert_eq!(heights.len(), n - 1);
        prop_assert!(heights.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(output.tree.root_node().leaf_count, n);
        prop_assert_eq!(output.tree.leaf_labels(output.tree.root()).len(), n);

        let reclustered = WpgmaClusterer::new().cluster(&output.matrix).unwrap();
        prop_assert_eq!(reclustered, output.tree);
    }
}
