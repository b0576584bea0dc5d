/// Tuning configuration for the word-morph engine

use crate::error::{MorphError, Result};
use crate::oracle::AgeBand;
use serde::Deserialize;
use std::path::Path;

// Request limits
pub const MAX_RESULT_COUNT: usize = 100;
pub const DEFAULT_RESULT_COUNT: usize = 10;
pub const MAX_PHRASE_LENGTH: usize = 3;

// Neighbor pool inflation before POS / dedup / diversity filtering
pub const NEIGHBOR_OVERSAMPLE: usize = 3;
// Adjective lookups discard most neighbors (nouns, verbs), so ask for more
pub const MODIFIER_OVERSAMPLE: usize = 20;
// Doubling retries when filtering leaves fewer than `count` words
pub const MAX_FILL_ATTEMPTS: usize = 4;

// Technical rows shipped with most Russian embedding packs
pub const RESERVED_TOKENS: &[&str] = &["<unk>", "<pad>"];

// Transformations
pub const SKIP_PLACEHOLDER: char = '_';
pub const MIN_TRANSFORM_LEN: usize = 3;

// Phrase composition
pub const DEFAULT_ADJECTIVES_PER_HEAD: usize = 5;
pub const DEFAULT_COMPATIBILITY_THRESHOLD: f32 = 0.5;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub oversample: usize,
    pub max_fill_attempts: usize,
    pub adjectives_per_head: usize,
    pub compatibility_threshold: f32,
    pub reserved_tokens: Vec<String>,
    pub age_bands: Vec<AgeBand>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oversample: NEIGHBOR_OVERSAMPLE,
            max_fill_attempts: MAX_FILL_ATTEMPTS,
            adjectives_per_head: DEFAULT_ADJECTIVES_PER_HEAD,
            compatibility_threshold: DEFAULT_COMPATIBILITY_THRESHOLD,
            reserved_tokens: RESERVED_TOKENS.iter().map(|t| t.to_string()).collect(),
            age_bands: AgeBand::defaults(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(raw).map_err(|e| MorphError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MorphError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<()> {
        if self.oversample == 0 {
            return Err(MorphError::config("oversample must be at least 1"));
        }
        if self.adjectives_per_head == 0 {
            return Err(MorphError::config("adjectives_per_head must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.compatibility_threshold) {
            return Err(MorphError::config(
                "compatibility_threshold must be within 0.0..=1.0",
            ));
        }
        Ok(())
    }
}
