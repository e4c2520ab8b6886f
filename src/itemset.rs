//! Canonical itemsets and the frequent-itemset table.

use std::fmt;

use ahash::AHashMap;

use crate::basket::ItemId;

/// An immutable set of item ids kept sorted and duplicate-free.
///
/// Equality, hashing and ordering are defined over the sorted sequence, so two
/// itemsets with the same members are equal whatever order they were built in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Itemset(Vec<ItemId>);

impl Itemset {
    /// Build from ids in any order; duplicates collapse.
    pub fn new(items: impl IntoIterator<Item = ItemId>) -> Self {
        let mut items: Vec<ItemId> = items.into_iter().collect();
        items.sort_unstable();
        items.dedup();
        Itemset(items)
    }

    /// Wrap ids the caller already holds strictly increasing.
    pub(crate) fn from_sorted(items: Vec<ItemId>) -> Self {
        debug_assert!(items.windows(2).all(|w| w[0] < w[1]));
        Itemset(items)
    }

    pub fn single(item: ItemId) -> Self {
        Itemset(vec![item])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[ItemId] {
        &self.0
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.0.binary_search(&item).is_ok()
    }

    /// Merge walk over both sorted lists.
    pub fn is_subset_of(&self, other: &Itemset) -> bool {
        let mut rest = other.0.iter();
        self.0.iter().all(|a| rest.by_ref().any(|b| b == a))
    }

    pub fn is_disjoint(&self, other: &Itemset) -> bool {
        self.0.iter().all(|a| !other.contains(*a))
    }

    pub fn union(&self, other: &Itemset) -> Itemset {
        Itemset::new(self.0.iter().chain(other.0.iter()).copied())
    }

    pub fn difference(&self, other: &Itemset) -> Itemset {
        Itemset(self.0.iter().copied().filter(|&x| !other.contains(x)).collect())
    }

    /// Apriori join: two k-itemsets sharing their first k−1 items produce the
    /// (k+1)-itemset of both. `None` when the prefixes differ or `self` does
    /// not sort before `other` on the last item.
    pub(crate) fn join(&self, other: &Itemset) -> Option<Itemset> {
        let k = self.0.len();
        if k == 0 || other.0.len() != k || self.0[..k - 1] != other.0[..k - 1] {
            return None;
        }
        let (a, b) = (self.0[k - 1], other.0[k - 1]);
        if a >= b {
            return None;
        }
        let mut items = Vec::with_capacity(k + 1);
        items.extend_from_slice(&self.0);
        items.push(b);
        Some(Itemset(items))
    }

    /// Every subset with exactly one item removed.
    pub(crate) fn drop_one(&self) -> impl Iterator<Item = Itemset> + '_ {
        (0..self.0.len()).map(move |skip| {
            Itemset(
                self.0
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != skip)
                    .map(|(_, &x)| x)
                    .collect(),
            )
        })
    }

    /// Resolve ids to names and join them with `sep`.
    ///
    /// Names come out alphabetically because ids are assigned in name order.
    pub fn render(&self, vocabulary: &[String], sep: &str) -> String {
        self.0
            .iter()
            .filter_map(|&id| {
                let name = vocabulary.get(id as usize);
                debug_assert!(name.is_some(), "item id {id} not in vocabulary");
                name.map(String::as_str)
            })
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl fmt::Display for Itemset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "}}")
    }
}

impl From<Itemset> for Vec<ItemId> {
    fn from(itemset: Itemset) -> Self {
        itemset.0
    }
}

/// A frequent itemset with its absolute count and relative support.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequentItemset {
    pub itemset: Itemset,
    pub count: u64,
    pub support: f64,
}

/// Frequent itemsets of one mining run, grouped by level.
///
/// This is the state the miner hands to the rule generator. It is downward
/// closed: every non-empty subset of a member is also a member.
#[derive(Debug, Clone, Default)]
pub struct FrequentItemsets {
    n_transactions: usize,
    /// `levels[k - 1]` holds the frequent k-itemsets in sorted order.
    levels: Vec<Vec<FrequentItemset>>,
    index: AHashMap<Itemset, (usize, usize)>,
}

impl FrequentItemsets {
    pub(crate) fn new(n_transactions: usize) -> Self {
        Self { n_transactions, levels: Vec::new(), index: AHashMap::new() }
    }

    /// Append the next level. Entries must be sorted by itemset.
    pub(crate) fn push_level(&mut self, level: Vec<(Itemset, u64)>) {
        let depth = self.levels.len();
        let n = self.n_transactions as f64;
        let entries: Vec<FrequentItemset> = level
            .into_iter()
            .enumerate()
            .map(|(pos, (itemset, count))| {
                self.index.insert(itemset.clone(), (depth, pos));
                FrequentItemset { itemset, count, support: count as f64 / n }
            })
            .collect();
        self.levels.push(entries);
    }

    pub fn n_transactions(&self) -> usize {
        self.n_transactions
    }

    /// Total number of frequent itemsets across levels.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Size of the largest frequent itemset (0 when empty).
    pub fn max_level(&self) -> usize {
        self.levels.len()
    }

    /// Frequent itemsets of size `k`, sorted; empty when there are none.
    pub fn level(&self, k: usize) -> &[FrequentItemset] {
        k.checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, itemset: &Itemset) -> Option<&FrequentItemset> {
        self.index
            .get(itemset)
            .map(|&(depth, pos)| &self.levels[depth][pos])
    }

    pub fn contains(&self, itemset: &Itemset) -> bool {
        self.index.contains_key(itemset)
    }

    pub fn support(&self, itemset: &Itemset) -> Option<f64> {
        self.get(itemset).map(|f| f.support)
    }

    pub fn count(&self, itemset: &Itemset) -> Option<u64> {
        self.get(itemset).map(|f| f.count)
    }

    /// All frequent itemsets, by size then in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &FrequentItemset> {
        self.levels.iter().flatten()
    }
}
