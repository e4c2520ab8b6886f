//! Association rules derived from a frequent-itemset table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::basket::ItemId;
use crate::error::{check_fraction, MiningError, Result};
use crate::itemset::{FrequentItemsets, Itemset};

/// Every non-empty proper antecedent of `itemset` with its complement.
///
/// Antecedents come out by size, then in lexicographic index order.
fn rule_combinations(itemset: &[ItemId]) -> Vec<(Itemset, Itemset)> {
    let n = itemset.len();
    let mut rules = Vec::new();
    for ant_size in 1..n {
        let mut indices: Vec<usize> = (0..ant_size).collect();
        loop {
            let mut in_ant = vec![false; n];
            for &i in &indices {
                in_ant[i] = true;
            }
            let ant: Vec<ItemId> = indices.iter().map(|&i| itemset[i]).collect();
            let con: Vec<ItemId> = (0..n).filter(|&i| !in_ant[i]).map(|i| itemset[i]).collect();
            rules.push((Itemset::from_sorted(ant), Itemset::from_sorted(con)));

            let mut i = ant_size as isize - 1;
            while i >= 0 {
                if indices[i as usize] < n - (ant_size - i as usize) { break; }
                i -= 1;
            }
            if i < 0 { break; }
            let i = i as usize;
            indices[i] += 1;
            for j in (i + 1)..ant_size { indices[j] = indices[j - 1] + 1; }
        }
    }
    rules
}

/// Interestingness measures of one rule `A → C`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleMetrics {
    pub antecedent_support: f64,
    pub consequent_support: f64,
    /// support(A ∪ C)
    pub support: f64,
    /// support(A ∪ C) / support(A)
    pub confidence: f64,
    /// confidence / support(C)
    pub lift: f64,
    pub leverage: f64,
    pub conviction: f64,
    pub zhangs_metric: f64,
    pub jaccard: f64,
    pub certainty: f64,
    pub kulczynski: f64,
}

impl RuleMetrics {
    /// Derive every measure from the three supports.
    ///
    /// Zero denominators follow the usual conventions: confidence and lift
    /// become `+∞`, conviction is `+∞` once confidence reaches 1, and Zhang's
    /// metric, Jaccard and certainty fall back to 0.
    pub fn compute(s_ac: f64, s_a: f64, s_c: f64) -> Self {
        let confidence = if s_a == 0.0 { f64::INFINITY } else { s_ac / s_a };
        let conf_ca = if s_c == 0.0 { f64::INFINITY } else { s_ac / s_c };
        let lift = if s_c == 0.0 { f64::INFINITY } else { confidence / s_c };
        Self::from_ratios(s_ac, s_a, s_c, confidence, conf_ca, lift)
    }

    /// Derive every measure from transaction counts over `n` transactions.
    ///
    /// Confidence and lift are single divisions of exact integer products, so
    /// a rule whose rational confidence is exactly 3/4 compares equal to 0.75.
    pub fn from_counts(count_ac: u64, count_a: u64, count_c: u64, n: u64) -> Self {
        let (ac, a, c, n) = (count_ac as f64, count_a as f64, count_c as f64, n as f64);
        let confidence = if count_a == 0 { f64::INFINITY } else { ac / a };
        let conf_ca = if count_c == 0 { f64::INFINITY } else { ac / c };
        let lift = if count_a == 0 || count_c == 0 { f64::INFINITY } else { (ac * n) / (a * c) };
        Self::from_ratios(ac / n, a / n, c / n, confidence, conf_ca, lift)
    }

    fn from_ratios(
        s_ac: f64,
        s_a: f64,
        s_c: f64,
        confidence: f64,
        conf_ca: f64,
        lift: f64,
    ) -> Self {
        let leverage = s_ac - s_a * s_c;
        let conviction = if confidence >= 1.0 {
            f64::INFINITY
        } else {
            (1.0 - s_c) / (1.0 - confidence)
        };
        let zd = f64::max(s_ac * (1.0 - s_a), s_a * (s_c - s_ac));
        let zhangs_metric = if zd == 0.0 { 0.0 } else { leverage / zd };
        let jd = s_a + s_c - s_ac;
        let jaccard = if jd == 0.0 { 0.0 } else { s_ac / jd };
        let cd = 1.0 - s_c;
        let certainty = if cd == 0.0 { 0.0 } else { (confidence - s_c) / cd };
        let kulczynski = (confidence + conf_ca) / 2.0;
        RuleMetrics {
            antecedent_support: s_a,
            consequent_support: s_c,
            support: s_ac,
            confidence,
            lift,
            leverage,
            conviction,
            zhangs_metric,
            jaccard,
            certainty,
            kulczynski,
        }
    }

    pub fn get(&self, metric: RuleMetric) -> f64 {
        match metric {
            RuleMetric::AntecedentSupport => self.antecedent_support,
            RuleMetric::ConsequentSupport => self.consequent_support,
            RuleMetric::Support => self.support,
            RuleMetric::Confidence => self.confidence,
            RuleMetric::Lift => self.lift,
            RuleMetric::Leverage => self.leverage,
            RuleMetric::Conviction => self.conviction,
            RuleMetric::ZhangsMetric => self.zhangs_metric,
            RuleMetric::Jaccard => self.jaccard,
            RuleMetric::Certainty => self.certainty,
            RuleMetric::Kulczynski => self.kulczynski,
        }
    }
}

/// Measure used to filter rules in [`generate_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMetric {
    AntecedentSupport,
    ConsequentSupport,
    Support,
    Confidence,
    Lift,
    Leverage,
    Conviction,
    ZhangsMetric,
    Jaccard,
    Certainty,
    Kulczynski,
}

const METRIC_NAMES: &[(&str, RuleMetric)] = &[
    ("antecedent support", RuleMetric::AntecedentSupport),
    ("consequent support", RuleMetric::ConsequentSupport),
    ("support", RuleMetric::Support),
    ("confidence", RuleMetric::Confidence),
    ("lift", RuleMetric::Lift),
    ("leverage", RuleMetric::Leverage),
    ("conviction", RuleMetric::Conviction),
    ("zhangs_metric", RuleMetric::ZhangsMetric),
    ("jaccard", RuleMetric::Jaccard),
    ("certainty", RuleMetric::Certainty),
    ("kulczynski", RuleMetric::Kulczynski),
];

impl RuleMetric {
    pub fn name(self) -> &'static str {
        METRIC_NAMES
            .iter()
            .find(|(_, m)| *m == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Threshold check: support-like measures live in (0, 1], the rest only
    /// need to be a number.
    fn check_threshold(self, threshold: f64) -> Result<()> {
        match self {
            RuleMetric::AntecedentSupport
            | RuleMetric::ConsequentSupport
            | RuleMetric::Support
            | RuleMetric::Confidence => check_fraction(self.name(), threshold),
            _ if threshold.is_nan() => {
                Err(MiningError::InvalidThreshold { name: self.name(), value: threshold })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for RuleMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleMetric {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self> {
        METRIC_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, m)| *m)
            .ok_or_else(|| MiningError::ConfigParse(format!("unknown metric: '{s}'")))
    }
}

/// A rule `antecedent → consequent` over disjoint itemsets.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationRule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    pub metrics: RuleMetrics,
}

impl AssociationRule {
    pub fn support(&self) -> f64 {
        self.metrics.support
    }

    pub fn confidence(&self) -> f64 {
        self.metrics.confidence
    }

    pub fn lift(&self) -> f64 {
        self.metrics.lift
    }

    /// antecedent ∪ consequent, the frequent itemset the rule was split from
    pub fn items(&self) -> Itemset {
        self.antecedent.union(&self.consequent)
    }
}

/// Rules whose confidence is at least `min_confidence`, in (0, 1].
pub fn generate(frequent: &FrequentItemsets, min_confidence: f64) -> Result<Vec<AssociationRule>> {
    generate_by(frequent, RuleMetric::Confidence, min_confidence)
}

/// Split every frequent itemset of size ≥ 2 into all antecedent/consequent
/// pairs and keep the rules whose `metric` reaches `threshold`.
///
/// Subset counts are looked up in `frequent`, never recounted. A missing
/// subset means the table is not downward closed and fails the whole call
/// with [`MiningError::MissingSupport`].
pub fn generate_by(
    frequent: &FrequentItemsets,
    metric: RuleMetric,
    threshold: f64,
) -> Result<Vec<AssociationRule>> {
    metric.check_threshold(threshold)?;

    let lookup = |itemset: &Itemset| -> Result<u64> {
        frequent.count(itemset).ok_or_else(|| MiningError::MissingSupport {
            itemset: itemset.items().to_vec(),
        })
    };
    let n = frequent.n_transactions() as u64;

    let mut rules = Vec::new();
    let mut considered = 0usize;
    for entry in frequent.iter().filter(|f| f.itemset.len() >= 2) {
        for (antecedent, consequent) in rule_combinations(entry.itemset.items()) {
            considered += 1;
            let count_a = lookup(&antecedent)?;
            let count_c = lookup(&consequent)?;
            let metrics = RuleMetrics::from_counts(entry.count, count_a, count_c, n);
            if metrics.get(metric) >= threshold {
                rules.push(AssociationRule { antecedent, consequent, metrics });
            }
        }
    }

    tracing::debug!(%metric, threshold, considered, kept = rules.len(), "generated rules");
    Ok(rules)
}
