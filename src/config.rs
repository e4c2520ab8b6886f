//! Mining configuration
//!
//! Thresholds for the Apriori pass and rule filtering, loadable from TOML.

use serde::{Deserialize, Serialize};

use crate::error::{check_fraction, MiningError, Result};

/// Options recognised by [`analyze`](crate::analyze).
///
/// # Examples
///
/// ```
/// use packset::MiningConfig;
///
/// let config = MiningConfig::default();
/// assert_eq!(config.min_support, 0.05);
/// assert_eq!(config.min_confidence, 0.4);
///
/// let config = MiningConfig::from_toml_str("min_support = 0.1").unwrap();
/// assert_eq!(config.min_support, 0.1);
/// assert_eq!(config.min_confidence, 0.4);
/// ```
///
/// TOML form:
///
/// ```toml
/// min_support = 0.05
/// min_confidence = 0.4
/// max_len = 3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Minimum fraction of transactions an itemset must appear in, in (0, 1]
    #[serde(default = "default_min_support")]
    pub min_support: f64,

    /// Minimum confidence for a rule to be kept, in (0, 1]
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Largest itemset size to mine. `None` mines until nothing is frequent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

fn default_min_support() -> f64 {
    0.05
}

fn default_min_confidence() -> f64 {
    0.4
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_support: default_min_support(),
            min_confidence: default_min_confidence(),
            max_len: None,
        }
    }
}

impl MiningConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// The result is validated before it is returned.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: MiningConfig =
            toml::from_str(s).map_err(|e| MiningError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Reject thresholds outside (0, 1] and a zero `max_len`.
    pub fn validate(&self) -> Result<()> {
        check_fraction("min_support", self.min_support)?;
        check_fraction("min_confidence", self.min_confidence)?;
        if self.max_len == Some(0) {
            return Err(MiningError::InvalidMaxLen);
        }
        Ok(())
    }
}
