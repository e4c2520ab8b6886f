//! Error types for mining and rule derivation

use thiserror::Error;

/// Errors that abort an analysis run.
///
/// Empty results (no transactions, nothing frequent, no rules) are not
/// errors; they produce an empty report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MiningError {
    /// A threshold is outside its valid range (or NaN)
    #[error("invalid {name}: {value} (expected a value in (0, 1])")]
    InvalidThreshold {
        /// Name of the offending option
        name: &'static str,
        /// Value that was supplied
        value: f64,
    },

    /// `max_len` must allow at least single items
    #[error("invalid max_len: 0 (expected at least 1)")]
    InvalidMaxLen,

    /// A subset of a frequent itemset has no recorded support.
    ///
    /// Means the frequent-itemset table is not downward closed, which is a
    /// miner defect rather than a data condition.
    #[error("missing support for itemset {itemset:?}; frequent itemsets are not downward closed")]
    MissingSupport {
        /// Item ids of the subset that could not be looked up
        itemset: Vec<u32>,
    },

    /// Configuration document could not be parsed
    #[error("configuration error: {0}")]
    ConfigParse(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, MiningError>;

/// Check that `value` is a fraction in (0, 1].
pub(crate) fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if value.is_nan() || value <= 0.0 || value > 1.0 {
        return Err(MiningError::InvalidThreshold { name, value });
    }
    Ok(())
}
