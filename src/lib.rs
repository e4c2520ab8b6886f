//! Frequent-itemset mining and packaging-set ranking.
//!
//! Transactions flow forward through four stages:
//!
//! 1. [`basket::encode`] groups raw (transaction, item) occurrences into
//!    deduplicated baskets.
//! 2. [`apriori::mine`] finds every itemset meeting a minimum support.
//! 3. [`association_rules::generate`] splits frequent itemsets into rules and
//!    keeps those meeting a minimum confidence.
//! 4. [`packaging::aggregate`] merges rules over the same items and ranks the
//!    groups by lift, then confidence.
//!
//! [`analyze`] runs all four with a [`MiningConfig`].

pub mod apriori;
pub mod association_rules;
pub mod basket;
mod common;
pub mod config;
pub mod error;
pub mod itemset;
pub mod packaging;
pub mod pipeline;

pub use association_rules::{AssociationRule, RuleMetric, RuleMetrics};
pub use basket::{BasketCollection, EncodeStats, Encoded, ItemId, Occurrence, Transaction};
pub use config::MiningConfig;
pub use error::{MiningError, Result};
pub use itemset::{FrequentItemset, FrequentItemsets, Itemset};
pub use packaging::{PackagingRecord, PackagingSet, PRODUCT_SEPARATOR};
pub use pipeline::{analyze, AnalysisSummary, PackagingReport, REPORT_HEADER};
