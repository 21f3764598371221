use crate::bio::alignment::{DistanceConfig, NeedlemanWunsch, ScoringConfig};
use crate::bio::fasta::InputFormat;
use crate::bio::sequence::Alphabet;
use crate::report::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub sequences: SequenceConfig,
    pub distance: DistanceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub alphabet: Alphabet,
    pub format: InputFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: ReportFormat,
    /// Digits after the decimal point in text and CSV reports
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            precision: 6,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), crate::SeqtreeError> {
        self.scoring.validate()?;
        self.distance.validate()?;
        Ok(())
    }

    /// Aligner configured from the scoring, alphabet and distance sections.
    pub fn aligner(&self) -> NeedlemanWunsch {
        NeedlemanWunsch::new(self.scoring)
            .with_alphabet(self.sequences.alphabet)
            .with_distance(self.distance)
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::SeqtreeError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::SeqtreeError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::SeqtreeError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::SeqtreeError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
