use crate::{PatternError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds and token lists that drive classification and clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternConfig {
    /// Minimum occurrences per month for a URL or pattern to count as pervasive
    pub pervasive_threshold: u64,

    /// Longest `origin + path` kept for analysis
    pub max_url_length: usize,

    /// Allowed growth of the candidate size window, in percent of the seed size
    pub size_match_percent: u64,

    /// Number of months tracked, ending at the current month
    pub months_tracked: usize,

    /// Unchanged path segments required before wildcarding several segments
    pub min_stable_path: usize,

    /// Minimum alignment ratio between two normalized filenames
    pub min_filename_ratio: f64,

    /// Maximum matching blocks between two normalized filenames, counting
    /// the zero-length terminator block
    pub max_filename_matching_blocks: usize,

    /// Maximum length difference between two normalized filenames
    pub max_filename_length_difference: usize,

    /// Filenames containing any of these tokens are never considered
    pub blocklist: Vec<String>,

    /// Literals replaced with `*` in every synthesized pattern
    pub wildcard_replace: Vec<String>,

    /// Tokens removed from filenames before comparing them, in order
    pub filename_ignore: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            pervasive_threshold: 100_000,
            max_url_length: 200,
            size_match_percent: 5,
            months_tracked: 6,
            min_stable_path: 2,
            min_filename_ratio: 0.5,
            max_filename_matching_blocks: 3,
            max_filename_length_difference: 2,
            blocklist: vec!["chunk".to_string()],
            wildcard_replace: vec!["en_US".to_string()],
            filename_ignore: [".js", ".css", "bundle", ".min", ".", "-", "[", "]"]
                .iter()
                .map(|token| token.to_string())
                .collect(),
        }
    }
}

impl PatternConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pervasive_threshold == 0 {
            return Err(PatternError::invalid_config(
                "pervasive_threshold must be > 0",
            ));
        }

        if self.months_tracked == 0 {
            return Err(PatternError::invalid_config("months_tracked must be > 0"));
        }

        if !(0.0..=1.0).contains(&self.min_filename_ratio) {
            return Err(PatternError::invalid_config(format!(
                "min_filename_ratio ({}) must be within [0, 1]",
                self.min_filename_ratio
            )));
        }

        if self.max_filename_matching_blocks == 0 {
            return Err(PatternError::invalid_config(
                "max_filename_matching_blocks must be > 0",
            ));
        }

        if self.wildcard_replace.iter().any(|token| token.is_empty()) {
            return Err(PatternError::invalid_config(
                "wildcard_replace entries must not be empty",
            ));
        }

        Ok(())
    }
}
