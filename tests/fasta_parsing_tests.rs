//! Reading sequence files from disk in both supported layouts.
use flate2::write::GzEncoder;
use flate2::Compression;
use pretty_assertions::assert_eq;
use seqtree::bio::fasta::{parse_fasta_from_bytes, parse_labelled_from_bytes, read_sequences, InputFormat};
use seqtree::{Alphabet, NeedlemanWunsch, Pipeline, ScoringConfig, SeqtreeError};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_labelled_file_round_trip_to_tree() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, ">x AAAA").unwrap();
    writeln!(file, ">y AAA T").unwrap();
    writeln!(file).unwrap();
    writeln!(file, ">Z tttt").unwrap();

    let sequences = read_sequences(file.path(), InputFormat::Labelled, Alphabet::Dna).unwrap();
    let ids: Vec<&str> = sequences.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["X", "Y", "Z"]);
    assert_eq!(sequences[1].sequence, b"AAAT".to_vec());
    assert_eq!(sequences[2].sequence, b"TTTT".to_vec());

    let output = Pipeline::new(NeedlemanWunsch::new(ScoringConfig::new(1, -1, -2)))
        .run_sequences(sequences)
        .unwrap();
    assert_eq!(output.tree.root_node().height, 30.0);
}

#[test]
fn test_multiline_fasta() {
    let data = b">seq1 first record\nACGT\nACGT\n>seq2\r\nGGCC\r\nAA\r\n";
    let sequences = parse_fasta_from_bytes(data, Alphabet::Dna).unwrap();
    assert_eq!(sequences.len(), 2);
    assert_eq!(sequences[0].id, "seq1");
    assert_eq!(sequences[0].sequence, b"ACGTACGT".to_vec());
    assert_eq!(sequences[1].sequence, b"GGCCAA".to_vec());
}

#[test]
fn test_gzip_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.fa.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(b">a\nACGU\n>b\nACGA\n").unwrap();
    encoder.finish().unwrap();

    let rna = read_sequences(&path, InputFormat::Fasta, Alphabet::Rna).unwrap();
    assert_eq!(rna.len(), 2);
    assert_eq!(rna[0].sequence, b"ACGU".to_vec());

    let err = read_sequences(&path, InputFormat::Fasta, Alphabet::Dna).unwrap_err();
    assert!(matches!(err, SeqtreeError::Input(_)));
}

#[test]
fn test_gzip_labelled_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.txt.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(b">human ACGT\n>mouse ACGA\n").unwrap();
    encoder.finish().unwrap();

    let sequences = read_sequences(&path, InputFormat::Labelled, Alphabet::Dna).unwrap();
    assert_eq!(sequences.len(), 2);
    assert_eq!(sequences[0].id, "Human");
    assert_eq!(sequences[1].sequence, b"ACGA".to_vec());
}

#[test]
fn test_missing_file_is_malformed_input() {
    let dir = TempDir::new().unwrap();
    let err = read_sequences(dir.path().join("absent.txt"), InputFormat::Labelled, Alphabet::Dna)
        .unwrap_err();
    assert!(matches!(err, SeqtreeError::Io(_)));
    assert!(err.is_malformed_input());
}

#[test]
fn test_stray_line_is_a_parse_error() {
    let err = parse_labelled_from_bytes(b">a ACGT\nACGT\n", Alphabet::Dna).unwrap_err();
    assert!(matches!(err, SeqtreeError::Parse(_)));

    let err = parse_labelled_from_bytes(b">lonely\n", Alphabet::Dna).unwrap_err();
    assert!(matches!(err, SeqtreeError::Parse(_)));
}

#[test]
fn test_symbol_outside_alphabet() {
    let err = parse_labelled_from_bytes(b">a ACGN\n", Alphabet::Dna).unwrap_err();
    assert!(matches!(err, SeqtreeError::Input(_)));
}
