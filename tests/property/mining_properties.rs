use packset::{
    analyze, apriori, association_rules, basket, packaging, Itemset, MiningConfig,
};
use proptest::prelude::*;

const N_ITEMS: u32 = 6;

/// Up to 16 transactions over a small item universe so brute force stays cheap.
fn transactions() -> impl Strategy<Value = Vec<Vec<u32>>> {
    prop::collection::vec(prop::collection::vec(0..N_ITEMS, 1..5), 0..16)
}

fn to_records(txns: &[Vec<u32>]) -> Vec<(String, String)> {
    txns.iter()
        .enumerate()
        .flat_map(|(t, items)| items.iter().map(move |i| (format!("T{t}"), format!("item{i}"))))
        .collect()
}

/// Count transactions containing every name in `names`.
fn brute_count(txns: &[Vec<u32>], names: &[String]) -> u64 {
    txns.iter()
        .filter(|items| {
            names
                .iter()
                .all(|name| items.iter().any(|i| format!("item{i}") == *name))
        })
        .count() as u64
}

proptest! {
    #[test]
    fn support_matches_brute_force(txns in transactions(), min_support in 0.05f64..=1.0) {
        let baskets = basket::encode(to_records(&txns)).baskets;
        let frequent = apriori::mine(&baskets, min_support).unwrap();
        let n = baskets.len();
        let vocab = baskets.vocabulary();

        // every non-empty subset of the observed vocabulary
        for mask in 1u32..(1 << vocab.len()) {
            let ids: Vec<u32> = (0..vocab.len() as u32).filter(|b| mask & (1 << b) != 0).collect();
            let names: Vec<String> = ids.iter().map(|&i| vocab[i as usize].clone()).collect();
            let count = brute_count(&txns, &names);
            let is_frequent = n > 0 && count as f64 / n as f64 >= min_support;
            let itemset = Itemset::new(ids);

            prop_assert_eq!(frequent.contains(&itemset), is_frequent, "itemset {}", itemset);
            if is_frequent {
                prop_assert_eq!(frequent.count(&itemset), Some(count));
            }
        }
    }

    #[test]
    fn support_is_anti_monotone(txns in transactions(), min_support in 0.05f64..=1.0) {
        let baskets = basket::encode(to_records(&txns)).baskets;
        let frequent = apriori::mine(&baskets, min_support).unwrap();

        for entry in frequent.iter().filter(|f| f.itemset.len() >= 2) {
            for &removed in entry.itemset.items() {
                let subset = Itemset::new(entry.itemset.items().iter().copied().filter(|&x| x != removed));
                let sub_support = frequent.support(&subset);
                prop_assert!(sub_support.is_some(), "subset {} of {} missing", subset, entry.itemset);
                prop_assert!(sub_support.unwrap() >= entry.support);
            }
        }
    }

    #[test]
    fn rules_split_frequent_itemsets(
        txns in transactions(),
        min_support in 0.05f64..=1.0,
        min_confidence in 0.05f64..=1.0,
    ) {
        let baskets = basket::encode(to_records(&txns)).baskets;
        let frequent = apriori::mine(&baskets, min_support).unwrap();
        let rules = association_rules::generate(&frequent, min_confidence).unwrap();

        for rule in &rules {
            prop_assert!(!rule.antecedent.is_empty());
            prop_assert!(!rule.consequent.is_empty());
            prop_assert!(rule.antecedent.is_disjoint(&rule.consequent));
            let union = rule.items();
            prop_assert_eq!(frequent.support(&union), Some(rule.support()));
            prop_assert!(rule.confidence() >= min_confidence);
            prop_assert!(rule.confidence() <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn aggregation_is_idempotent_and_ranked(
        txns in transactions(),
        min_support in 0.05f64..=1.0,
        min_confidence in 0.05f64..=1.0,
    ) {
        let baskets = basket::encode(to_records(&txns)).baskets;
        let frequent = apriori::mine(&baskets, min_support).unwrap();
        let rules = association_rules::generate(&frequent, min_confidence).unwrap();

        let first = packaging::aggregate(&rules, &baskets);
        let second = packaging::aggregate(&rules, &baskets);
        prop_assert_eq!(&first, &second);

        for (idx, set) in first.iter().enumerate() {
            prop_assert_eq!(set.rank, idx + 1);
            prop_assert!(set.items.len() >= 2);
        }
        for pair in first.windows(2) {
            prop_assert!(
                pair[0].max_lift > pair[1].max_lift
                    || (pair[0].max_lift == pair[1].max_lift
                        && pair[0].max_confidence >= pair[1].max_confidence)
            );
        }
        let mut products: Vec<&str> = first.iter().map(|s| s.products.as_str()).collect();
        products.sort_unstable();
        products.dedup();
        prop_assert_eq!(products.len(), first.len());
    }

    #[test]
    fn ranking_ignores_input_order(
        txns in transactions(),
        min_support in 0.05f64..=1.0,
        min_confidence in 0.05f64..=1.0,
    ) {
        let config = MiningConfig::default()
            .with_min_support(min_support)
            .with_min_confidence(min_confidence);
        let records = to_records(&txns);
        let mut reversed = records.clone();
        reversed.reverse();

        let forward = analyze(records, &config).unwrap().records();
        let backward = analyze(reversed, &config).unwrap().records();
        prop_assert_eq!(forward, backward);
    }
}
