use crate::{Result, SeqtreeError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub sequence: Vec<u8>,
}

/// Residue alphabet a sequence is checked against before alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    #[default]
    Dna,
    Rna,
    Protein,
}

impl Alphabet {
    pub fn symbols(&self) -> &'static [u8] {
        match self {
            Alphabet::Dna => b"ACGT",
            Alphabet::Rna => b"ACGU",
            Alphabet::Protein => b"ACDEFGHIKLMNPQRSTVWY",
        }
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.symbols().contains(&symbol)
    }

    /// Reject empty sequences and sequences holding a symbol outside the alphabet.
    pub fn validate(&self, seq: &Sequence) -> Result<()> {
        if seq.is_empty() {
            return Err(SeqtreeError::Input(format!("sequence '{}' is empty", seq.id)));
        }
        if let Some((pos, &symbol)) = seq
            .sequence
            .iter()
            .enumerate()
            .find(|(_, &c)| !self.contains(c))
        {
            return Err(SeqtreeError::Input(format!(
                "sequence '{}' has symbol '{}' at position {} outside the {} alphabet",
                seq.id,
                char::from(symbol).escape_default(),
                pos + 1,
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Alphabet::Dna => "dna",
            Alphabet::Rna => "rna",
            Alphabet::Protein => "protein",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Alphabet {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dna" | "nucleotide" => Ok(Alphabet::Dna),
            "rna" => Ok(Alphabet::Rna),
            "protein" | "aa" => Ok(Alphabet::Protein),
            _ => Err(format!("Unknown alphabet: {}", s)),
        }
    }
}

impl Sequence {
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    /// Build a sequence and validate it in one step.
    pub fn validated(
        id: impl Into<String>,
        sequence: impl Into<Vec<u8>>,
        alphabet: Alphabet,
    ) -> Result<Self> {
        let seq = Self::new(id, sequence);
        alphabet.validate(&seq)?;
        Ok(seq)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn residues(&self) -> &[u8] {
        &self.sequence
    }

    pub fn header(&self) -> String {
        format!(">{}", self.id)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.sequence))
    }
}
