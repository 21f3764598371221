use crate::bio::sequence::{Alphabet, Sequence};
use crate::{Result, SeqtreeError};
use flate2::read::GzDecoder;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1},
    character::complete::{line_ending, not_line_ending, space0, space1},
    combinator::{eof, opt},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Layout of a sequence file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// One record per line: `>label RESIDUES [MORE RESIDUES ...]`.
    #[default]
    Labelled,
    /// Conventional FASTA with residues on the lines following the header.
    Fasta,
}

impl std::str::FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "labelled" | "labeled" | "line" => Ok(InputFormat::Labelled),
            "fasta" | "fa" => Ok(InputFormat::Fasta),
            _ => Err(format!("Unknown input format: {}", s)),
        }
    }
}

fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

fn is_line_end(c: u8) -> bool {
    c == b'\n' || c == b'\r'
}

/// `>label residues...` on a single (already trimmed) line.
fn parse_labelled_line(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8])> {
    let (input, _) = tag(b">")(input)?;
    let (input, _) = space0(input)?;
    let (input, label) = take_till1(|c: u8| is_blank(c) || is_line_end(c))(input)?;
    let (input, _) = space1(input)?;
    let (input, residues) = not_line_ending(input)?;
    Ok((input, (label, residues)))
}

/// Parse a FASTA header line
fn parse_header(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = take_till1(|c: u8| is_blank(c) || is_line_end(c))(input)?;
    // The description, if any, is not kept.
    let (input, _) = take_till(is_line_end)(input)?;
    let (input, _) = alt((line_ending, eof))(input)?;
    Ok((input, id))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) = take_till::<_, _, nom::error::Error<_>>(is_line_end)(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;
        // A lone '\r' is not a line ending for nom; step over it.
        let rest = if rest.len() == remaining.len() { &rest[1..] } else { rest };

        for &c in line {
            if !c.is_ascii_whitespace() {
                sequence.push(c.to_ascii_uppercase());
            }
        }

        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Lower-case the label, then capitalise its first letter.
pub fn normalize_label(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse the one-record-per-line format.
///
/// Blank lines are skipped; any other line that does not start with `>` is
/// malformed, as is a record missing either its label or its residues.
pub fn parse_labelled_from_bytes(data: &[u8], alphabet: Alphabet) -> Result<Vec<Sequence>> {
    let mut sequences = Vec::new();

    for (line_no, raw) in data.split(|&c| c == b'\n').enumerate() {
        let line = raw.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let (_, (label, residues)) = parse_labelled_line(line).map_err(|_| {
            SeqtreeError::Parse(format!("line {}: expected '>label residues'", line_no + 1))
        })?;

        let label = std::str::from_utf8(label)
            .map_err(|_| SeqtreeError::Parse(format!("line {}: label is not UTF-8", line_no + 1)))?;
        let residues: Vec<u8> = residues
            .iter()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        sequences.push(Sequence::validated(normalize_label(label), residues, alphabet)?);
    }

    debug!("Parsed {} labelled records", sequences.len());
    Ok(sequences)
}

/// Parse conventional FASTA from bytes
pub fn parse_fasta_from_bytes(data: &[u8], alphabet: Alphabet) -> Result<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut remaining = data;

    loop {
        while !remaining.is_empty() && remaining[0].is_ascii_whitespace() {
            remaining = &remaining[1..];
        }

        if remaining.is_empty() {
            break;
        }

        if remaining[0] != b'>' {
            return Err(SeqtreeError::Parse(
                "expected '>' at the start of a FASTA record".to_string(),
            ));
        }

        let (rest, id) = parse_header(remaining)
            .map_err(|_| SeqtreeError::Parse("Failed to parse FASTA header".to_string()))?;
        let (rest, residues) = parse_sequence(rest)
            .map_err(|_| SeqtreeError::Parse("Failed to parse FASTA sequence".to_string()))?;

        let id = std::str::from_utf8(id).map_err(|_| {
            SeqtreeError::Parse(format!("record {}: identifier is not UTF-8", sequences.len() + 1))
        })?;

        sequences.push(Sequence::validated(id, residues, alphabet)?);
        remaining = rest;
    }

    debug!("Parsed {} FASTA records", sequences.len());
    Ok(sequences)
}

/// Read and validate every record of a sequence file (supports .gz compression)
pub fn read_sequences<P: AsRef<Path>>(
    path: P,
    format: InputFormat,
    alphabet: Alphabet,
) -> Result<Vec<Sequence>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut buffer = Vec::new();

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        GzDecoder::new(BufReader::new(file)).read_to_end(&mut buffer)?;
    } else {
        BufReader::new(file).read_to_end(&mut buffer)?;
    }

    match format {
        InputFormat::Labelled => parse_labelled_from_bytes(&buffer, alphabet),
        InputFormat::Fasta => parse_fasta_from_bytes(&buffer, alphabet),
    }
}
