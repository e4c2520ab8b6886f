//! Level-wise Apriori search over an inverted index of transaction bitsets.
//!
//! Each frequent itemset of the current level keeps the bitset of the
//! transactions containing it. A candidate built by joining two itemsets of
//! the level is counted by intersecting their two bitsets, so support is exact
//! without rescanning baskets.

use rayon::prelude::*;

use crate::basket::{BasketCollection, ItemId};
use crate::common::{count_item_support, min_count};
use crate::error::{check_fraction, MiningError, Result};
use crate::itemset::{FrequentItemsets, Itemset};

/// Simple BitSet backed by `Vec<u64>`, one bit per transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
struct BitSet {
    blocks: Vec<u64>,
}

impl BitSet {
    fn new(num_bits: usize) -> Self {
        BitSet {
            blocks: vec![0; num_bits.div_ceil(64)],
        }
    }

    #[inline]
    fn set(&mut self, bit: usize) {
        self.blocks[bit / 64] |= 1 << (bit % 64);
    }

    #[inline]
    fn count_ones(&self) -> u64 {
        self.blocks.iter().map(|b| b.count_ones() as u64).sum()
    }

    #[inline]
    fn intersect(&self, other: &BitSet) -> BitSet {
        let blocks = self.blocks
            .iter()
            .zip(other.blocks.iter())
            .map(|(a, b)| a & b)
            .collect();
        BitSet { blocks }
    }
}

/// A frequent itemset of the level being extended, with its transactions.
struct LevelEntry {
    itemset: Itemset,
    tids: BitSet,
    count: u64,
}

/// Mine every itemset whose support is at least `min_support`.
///
/// `min_support` must lie in (0, 1]. An empty collection, or a threshold no
/// single item reaches, gives an empty table.
pub fn mine(baskets: &BasketCollection, min_support: f64) -> Result<FrequentItemsets> {
    mine_with(baskets, min_support, None)
}

/// [`mine`] with an optional cap on itemset size.
pub fn mine_with(
    baskets: &BasketCollection,
    min_support: f64,
    max_len: Option<usize>,
) -> Result<FrequentItemsets> {
    check_fraction("min_support", min_support)?;
    if max_len == Some(0) {
        return Err(MiningError::InvalidMaxLen);
    }

    let n_rows = baskets.len();
    let mut frequent = FrequentItemsets::new(n_rows);
    if n_rows == 0 {
        tracing::debug!("no transactions to mine");
        return Ok(frequent);
    }
    let min_count = min_count(min_support, n_rows);

    let mut level = frequent_singletons(baskets, min_count);
    let mut k = 1usize;
    tracing::debug!(
        level = k,
        candidates = baskets.n_items(),
        frequent = level.len(),
        min_count,
        "apriori level"
    );

    while !level.is_empty() {
        frequent.push_level(
            level
                .iter()
                .map(|entry| (entry.itemset.clone(), entry.count))
                .collect(),
        );
        if max_len.is_some_and(|ml| k >= ml) {
            break;
        }

        let (candidates, pruned) = candidates(&level, &frequent);
        k += 1;
        let n_candidates = candidates.len();
        level = count_candidates(&level, candidates, min_count);
        tracing::debug!(
            level = k,
            candidates = n_candidates,
            pruned,
            frequent = level.len(),
            "apriori level"
        );
    }

    tracing::debug!(
        transactions = n_rows,
        itemsets = frequent.len(),
        max_level = frequent.max_level(),
        "mining finished"
    );
    Ok(frequent)
}

/// Level 1: every observed item with its transaction bitset, kept if frequent.
fn frequent_singletons(baskets: &BasketCollection, min_count: u64) -> Vec<LevelEntry> {
    let rows = baskets.rows();
    let n_items = baskets.n_items();
    let item_count = count_item_support(&rows, n_items);

    let mut bitsets: Vec<Option<BitSet>> = item_count
        .iter()
        .map(|&c| (c >= min_count).then(|| BitSet::new(rows.len())))
        .collect();
    for (r, row) in rows.iter().enumerate() {
        for &item in row {
            if let Some(bs) = bitsets[item as usize].as_mut() {
                bs.set(r);
            }
        }
    }

    bitsets
        .into_iter()
        .enumerate()
        .filter_map(|(item, bs)| {
            bs.map(|tids| LevelEntry {
                itemset: Itemset::single(item as ItemId),
                tids,
                count: item_count[item],
            })
        })
        .collect()
}

/// Join itemsets of the level that share all but their last item, then drop
/// any candidate with an infrequent subset before it is counted.
///
/// Returns `(level_i, level_j, candidate)` triples in sorted candidate order
/// and the number of joined candidates removed by the subset check.
fn candidates(
    level: &[LevelEntry],
    frequent: &FrequentItemsets,
) -> (Vec<(usize, usize, Itemset)>, usize) {
    let mut out = Vec::new();
    let mut pruned = 0usize;
    for i in 0..level.len() {
        for j in (i + 1)..level.len() {
            // Level is sorted, so equal prefixes are contiguous.
            let Some(candidate) = level[i].itemset.join(&level[j].itemset) else {
                break;
            };
            if candidate.drop_one().all(|subset| frequent.contains(&subset)) {
                out.push((i, j, candidate));
            } else {
                pruned += 1;
            }
        }
    }
    (out, pruned)
}

/// Exact support of each candidate from its parents' bitsets; keeps the
/// frequent ones. Candidates are independent, so they are counted in parallel.
fn count_candidates(
    level: &[LevelEntry],
    candidates: Vec<(usize, usize, Itemset)>,
    min_count: u64,
) -> Vec<LevelEntry> {
    candidates
        .into_par_iter()
        .filter_map(|(i, j, itemset)| {
            let tids = level[i].tids.intersect(&level[j].tids);
            let count = tids.count_ones();
            (count >= min_count).then_some(LevelEntry { itemset, tids, count })
        })
        .collect()
}
