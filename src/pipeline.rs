//! End-to-end analysis: encode → mine → derive rules → rank packaging sets.

use serde::Serialize;

use crate::apriori::mine_with;
use crate::association_rules::generate;
use crate::basket::{encode, EncodeStats, Occurrence};
use crate::config::MiningConfig;
use crate::error::Result;
use crate::packaging::{aggregate, PackagingRecord, PackagingSet};

/// Column headers of the packaging report, in record field order.
pub const REPORT_HEADER: [&str; 4] = [
    "Packaging Set ID",
    "Products",
    "Maximum Lift",
    "Maximum Confidence",
];

/// Counts gathered along one analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub transactions: usize,
    pub distinct_items: usize,
    pub frequent_itemsets: usize,
    pub rules: usize,
    pub packaging_sets: usize,
    pub dropped_rows: usize,
}

/// Ranked packaging sets of one run plus its summary.
///
/// An empty `sets` is a normal outcome and renders as a header-only report.
#[derive(Debug, Clone, Default)]
pub struct PackagingReport {
    pub sets: Vec<PackagingSet>,
    pub summary: AnalysisSummary,
}

impl PackagingReport {
    pub fn header() -> [&'static str; 4] {
        REPORT_HEADER
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn records(&self) -> Vec<PackagingRecord> {
        self.sets.iter().map(PackagingSet::record).collect()
    }
}

/// Run the whole engine over raw occurrences.
///
/// The configuration is validated before anything is encoded. Every run owns
/// its data, so concurrent calls share nothing.
///
/// # Examples
///
/// ```
/// use packset::{analyze, MiningConfig};
///
/// let records = vec![("T1", "A"), ("T1", "B"), ("T2", "A"), ("T2", "B"),
///                    ("T3", "A"), ("T3", "C"), ("T4", "A"), ("T4", "B"), ("T4", "C")];
/// let config = MiningConfig::default().with_min_support(0.5).with_min_confidence(0.5);
/// let report = analyze(records, &config).unwrap();
///
/// assert_eq!(report.sets[0].products, "A;B");
/// assert_eq!(report.sets[0].rank, 1);
/// ```
pub fn analyze<I, R>(records: I, config: &MiningConfig) -> Result<PackagingReport>
where
    I: IntoIterator<Item = R>,
    R: Into<Occurrence>,
{
    config.validate()?;

    let encoded = encode(records);
    let baskets = encoded.baskets;
    let EncodeStats { dropped, .. } = encoded.stats;

    let frequent = mine_with(&baskets, config.min_support, config.max_len)?;
    let rules = generate(&frequent, config.min_confidence)?;
    let sets = aggregate(&rules, &baskets);

    let summary = AnalysisSummary {
        transactions: baskets.len(),
        distinct_items: baskets.n_items(),
        frequent_itemsets: frequent.len(),
        rules: rules.len(),
        packaging_sets: sets.len(),
        dropped_rows: dropped,
    };
    tracing::info!(
        transactions = summary.transactions,
        items = summary.distinct_items,
        frequent_itemsets = summary.frequent_itemsets,
        rules = summary.rules,
        packaging_sets = summary.packaging_sets,
        min_support = config.min_support,
        min_confidence = config.min_confidence,
        "analysis complete"
    );

    Ok(PackagingReport { sets, summary })
}
