use crate::libs::error::{MafError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds that drive the merge, split and filter stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Largest distance, in nucleotides, between continuous rows
    pub allowed_dist: u64,
    /// Fewest sequence rows an emitted block may have
    pub min_block_rows: usize,
    /// Shortest ungapped target an emitted block may have
    pub min_block_length: u64,
    /// Blocks at least this long never lose species to a merge
    pub min_length_before_deletion: u64,
    pub max_species_deletions: usize,
    pub max_block_width_before_split: usize,
}

/// Values used by the command line when no configuration file is given.
impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            allowed_dist: 12,
            min_block_rows: 3,
            min_block_length: 12,
            min_length_before_deletion: 60,
            max_species_deletions: 1,
            max_block_width_before_split: 3000,
        }
    }
}

impl StreamConfig {
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::default()
    }

    /// Reads a JSON object holding every field.
    ///
    /// ```
    /// let config = mafstream::libs::config::StreamConfig::from_json_str(
    ///     r#"{"allowed_dist": 12, "min_block_rows": 3, "min_block_length": 12,
    ///         "min_length_before_deletion": 60, "max_species_deletions": 1,
    ///         "max_block_width_before_split": 3000}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.allowed_dist, 12);
    ///
    /// assert!(mafstream::libs::config::StreamConfig::from_json_str(r#"{"allowed_dist": 12}"#).is_err());
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()
    }

    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(self) -> Result<Self> {
        if self.max_block_width_before_split < 2 {
            return Err(MafError::InvalidConfig(format!(
                "max_block_width_before_split must be at least 2, got {}",
                self.max_block_width_before_split
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreamConfigBuilder {
    allowed_dist: Option<u64>,
    min_block_rows: Option<usize>,
    min_block_length: Option<u64>,
    min_length_before_deletion: Option<u64>,
    max_species_deletions: Option<usize>,
    max_block_width_before_split: Option<usize>,
}

impl StreamConfigBuilder {
    pub fn allowed_dist(mut self, value: u64) -> Self {
        self.allowed_dist = Some(value);
        self
    }

    pub fn min_block_rows(mut self, value: usize) -> Self {
        self.min_block_rows = Some(value);
        self
    }

    pub fn min_block_length(mut self, value: u64) -> Self {
        self.min_block_length = Some(value);
        self
    }

    pub fn min_length_before_deletion(mut self, value: u64) -> Self {
        self.min_length_before_deletion = Some(value);
        self
    }

    pub fn max_species_deletions(mut self, value: usize) -> Self {
        self.max_species_deletions = Some(value);
        self
    }

    pub fn max_block_width_before_split(mut self, value: usize) -> Self {
        self.max_block_width_before_split = Some(value);
        self
    }

    /// Fails on the first field left unset.
    pub fn build(self) -> Result<StreamConfig> {
        StreamConfig {
            allowed_dist: self
                .allowed_dist
                .ok_or(MafError::MissingConfig("allowed_dist"))?,
            min_block_rows: self
                .min_block_rows
                .ok_or(MafError::MissingConfig("min_block_rows"))?,
            min_block_length: self
                .min_block_length
                .ok_or(MafError::MissingConfig("min_block_length"))?,
            min_length_before_deletion: self
                .min_length_before_deletion
                .ok_or(MafError::MissingConfig("min_length_before_deletion"))?,
            max_species_deletions: self
                .max_species_deletions
                .ok_or(MafError::MissingConfig("max_species_deletions"))?,
            max_block_width_before_split: self
                .max_block_width_before_split
                .ok_or(MafError::MissingConfig("max_block_width_before_split"))?,
        }
        .validate()
    }
}
