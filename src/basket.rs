//! Basket encoding: (transaction, item) occurrences → deduplicated baskets.
//!
//! Item names are interned into dense `u32` ids assigned in lexicographic
//! order of the names, so a sorted id list is also an alphabetically sorted
//! name list. Every downstream component works on ids.

use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Dense id of an interned item name.
pub type ItemId = u32;

/// One raw (transaction, item) occurrence as handed over by ingestion.
///
/// Either field may be missing; such rows are dropped by [`encode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub transaction_id: Option<String>,
    pub item: Option<String>,
}

impl Occurrence {
    pub fn new(transaction_id: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            transaction_id: Some(transaction_id.into()),
            item: Some(item.into()),
        }
    }
}

impl<T: Into<String>, I: Into<String>> From<(T, I)> for Occurrence {
    fn from((transaction_id, item): (T, I)) -> Self {
        Occurrence::new(transaction_id, item)
    }
}

/// A transaction id and its sorted, duplicate-free item ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: String,
    items: Vec<ItemId>,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Item ids, strictly increasing.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }
}

/// Encoded transactions plus the item vocabulary.
///
/// Invariants: transaction ids are unique, every item list is non-empty and
/// strictly increasing, every id indexes into `vocabulary`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasketCollection {
    transactions: Vec<Transaction>,
    vocabulary: Vec<String>,
}

impl BasketCollection {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Transactions in first-seen order of their ids.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Item names indexed by [`ItemId`], sorted.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn n_items(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.vocabulary
            .binary_search_by(|known| known.as_str().cmp(name))
            .ok()
            .map(|idx| idx as ItemId)
    }

    pub fn item_name(&self, id: ItemId) -> Option<&str> {
        self.vocabulary.get(id as usize).map(String::as_str)
    }

    /// Item id rows, one per transaction, in transaction order.
    pub(crate) fn rows(&self) -> Vec<Vec<ItemId>> {
        self.transactions.iter().map(|t| t.items.clone()).collect()
    }
}

/// Row accounting for one [`encode`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Rows seen
    pub rows: usize,
    /// Rows dropped for a missing or blank transaction id or item name
    pub dropped: usize,
    /// Rows that repeated an item already in their transaction
    pub duplicates: usize,
}

/// Output of [`encode`].
#[derive(Debug, Clone, Default)]
pub struct Encoded {
    pub baskets: BasketCollection,
    pub stats: EncodeStats,
}

fn clean(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|s| !s.is_empty())
}

/// Group occurrences into one deduplicated basket per transaction id.
///
/// Both fields are trimmed; rows with a missing or blank field are dropped.
/// An item repeated within a transaction counts once. Empty input yields an
/// empty collection.
pub fn encode<I, R>(records: I) -> Encoded
where
    I: IntoIterator<Item = R>,
    R: Into<Occurrence>,
{
    let mut stats = EncodeStats::default();
    let mut cleaned: Vec<(String, String)> = Vec::new();

    for record in records {
        stats.rows += 1;
        let record: Occurrence = record.into();
        match (clean(record.transaction_id.as_deref()), clean(record.item.as_deref())) {
            (Some(txn), Some(item)) => cleaned.push((txn.to_owned(), item.to_owned())),
            _ => stats.dropped += 1,
        }
    }

    let vocabulary: Vec<String> = cleaned
        .iter()
        .map(|(_, item)| item.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let item_ids: AHashMap<&str, ItemId> = vocabulary
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx as ItemId))
        .collect();

    let mut txn_index: AHashMap<&str, usize> = AHashMap::new();
    let mut grouped: Vec<(&str, Vec<ItemId>)> = Vec::new();
    for (txn, item) in &cleaned {
        let slot = *txn_index.entry(txn.as_str()).or_insert_with(|| {
            grouped.push((txn.as_str(), Vec::new()));
            grouped.len() - 1
        });
        grouped[slot].1.push(item_ids[item.as_str()]);
    }

    let transactions: Vec<Transaction> = grouped
        .into_iter()
        .map(|(id, mut items)| {
            let before = items.len();
            items.sort_unstable();
            items.dedup();
            stats.duplicates += before - items.len();
            Transaction { id: id.to_owned(), items }
        })
        .collect();

    tracing::debug!(
        rows = stats.rows,
        dropped = stats.dropped,
        duplicates = stats.duplicates,
        transactions = transactions.len(),
        items = vocabulary.len(),
        "encoded baskets"
    );

    Encoded {
        baskets: BasketCollection { transactions, vocabulary },
        stats,
    }
}
