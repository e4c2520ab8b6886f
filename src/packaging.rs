//! Packaging sets: rules collapsed by item union, then ranked.

use std::cmp::Ordering;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::association_rules::AssociationRule;
use crate::basket::BasketCollection;
use crate::itemset::Itemset;

/// Separator between product names in [`PackagingSet::products`].
pub const PRODUCT_SEPARATOR: &str = ";";

/// A unique group of co-occurring items with the best scores seen for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PackagingSet {
    /// 1-based position after ranking; not stable across runs
    pub rank: usize,
    pub items: Itemset,
    /// Item names joined by [`PRODUCT_SEPARATOR`], alphabetically
    pub products: String,
    pub max_lift: f64,
    pub max_confidence: f64,
}

impl PackagingSet {
    pub fn record(&self) -> PackagingRecord {
        PackagingRecord {
            rank: self.rank,
            products: self.products.clone(),
            max_lift: self.max_lift,
            max_confidence: self.max_confidence,
        }
    }
}

/// Flat output row handed to report writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagingRecord {
    pub rank: usize,
    pub products: String,
    pub max_lift: f64,
    pub max_confidence: f64,
}

/// Group `rules` by antecedent ∪ consequent and rank the groups.
///
/// Each group keeps the largest lift and the largest confidence among its
/// rules; the two maxima may come from different rules. Groups are ordered by
/// lift, then confidence, both descending, with the product string as the
/// final ascending tie-break. Unions with fewer than two items are skipped.
pub fn aggregate(rules: &[AssociationRule], baskets: &BasketCollection) -> Vec<PackagingSet> {
    let mut groups: AHashMap<Itemset, (f64, f64)> = AHashMap::new();
    let mut skipped = 0usize;
    for rule in rules {
        let items = rule.items();
        if items.len() < 2 {
            skipped += 1;
            continue;
        }
        let best = groups
            .entry(items)
            .or_insert((f64::NEG_INFINITY, f64::NEG_INFINITY));
        best.0 = best.0.max(rule.lift());
        best.1 = best.1.max(rule.confidence());
    }

    let mut sets: Vec<PackagingSet> = groups
        .into_iter()
        .map(|(items, (max_lift, max_confidence))| PackagingSet {
            rank: 0,
            products: items.render(baskets.vocabulary(), PRODUCT_SEPARATOR),
            items,
            max_lift,
            max_confidence,
        })
        .collect();

    sets.sort_by(ranking);
    for (idx, set) in sets.iter_mut().enumerate() {
        set.rank = idx + 1;
    }

    tracing::debug!(rules = rules.len(), skipped, packaging_sets = sets.len(), "aggregated rules");
    sets
}

fn ranking(a: &PackagingSet, b: &PackagingSet) -> Ordering {
    b.max_lift
        .total_cmp(&a.max_lift)
        .then_with(|| b.max_confidence.total_cmp(&a.max_confidence))
        .then_with(|| a.products.cmp(&b.products))
        .then_with(|| a.items.cmp(&b.items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association_rules::RuleMetrics;
    use crate::basket::encode;

    fn baskets() -> BasketCollection {
        encode(vec![("T1", "A"), ("T1", "B"), ("T1", "C"), ("T1", "D")]).baskets
    }

    fn rule(ant: &[u32], con: &[u32], confidence: f64, lift: f64) -> AssociationRule {
        let mut metrics = RuleMetrics::compute(0.5, 0.5, 0.5);
        metrics.confidence = confidence;
        metrics.lift = lift;
        AssociationRule {
            antecedent: Itemset::new(ant.iter().copied()),
            consequent: Itemset::new(con.iter().copied()),
            metrics,
        }
    }

    #[test]
    fn test_groups_by_union_with_independent_maxima() {
        let rules = vec![
            rule(&[0], &[1], 0.9, 1.2),
            rule(&[1], &[0], 0.6, 1.8),
        ];
        let sets = aggregate(&rules, &baskets());
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].products, "A;B");
        assert_eq!(sets[0].max_lift, 1.8);
        assert_eq!(sets[0].max_confidence, 0.9);
        assert_eq!(sets[0].rank, 1);
    }

    #[test]
    fn test_split_order_does_not_matter() {
        let rules = vec![
            rule(&[0, 2], &[1], 0.5, 1.1),
            rule(&[1], &[2, 0], 0.7, 1.0),
            rule(&[2], &[0, 1], 0.4, 1.3),
        ];
        let sets = aggregate(&rules, &baskets());
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].products, "A;B;C");
        assert_eq!(sets[0].items, Itemset::new([0, 1, 2]));
        assert_eq!(sets[0].max_lift, 1.3);
        assert_eq!(sets[0].max_confidence, 0.7);
    }

    #[test]
    fn test_ranking_order() {
        let rules = vec![
            rule(&[0], &[1], 0.5, 1.0),
            rule(&[0], &[2], 0.9, 2.0),
            rule(&[1], &[3], 0.6, 2.0),
            rule(&[2], &[3], 0.6, 2.0),
        ];
        let sets = aggregate(&rules, &baskets());
        let order: Vec<(&str, usize)> = sets.iter().map(|s| (s.products.as_str(), s.rank)).collect();
        assert_eq!(order, vec![("A;C", 1), ("B;D", 2), ("C;D", 3), ("A;B", 4)]);
    }

    #[test]
    fn test_single_item_unions_skipped() {
        let rules = vec![
            rule(&[0], &[], 1.0, 5.0),
            rule(&[0], &[1], 0.5, 1.0),
        ];
        let sets = aggregate(&rules, &baskets());
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].products, "A;B");
    }

    #[test]
    fn test_empty_rules() {
        assert!(aggregate(&[], &baskets()).is_empty());
    }

    #[test]
    fn test_idempotent_on_unique_unions() {
        let rules = vec![
            rule(&[0], &[1], 0.5, 1.0),
            rule(&[2], &[3], 0.7, 1.4),
        ];
        let first = aggregate(&rules, &baskets());
        let second = aggregate(&rules, &baskets());
        assert_eq!(first, second);
        assert_eq!(first.len(), rules.len());
    }

    #[test]
    fn test_record_serializes() {
        let sets = aggregate(&[rule(&[0], &[1], 0.75, 1.0)], &baskets());
        let json = serde_json::to_value(sets[0].record()).unwrap();
        assert_eq!(json["rank"], 1);
        assert_eq!(json["products"], "A;B");
        assert_eq!(json["max_lift"], 1.0);
        assert_eq!(json["max_confidence"], 0.75);
    }
}
