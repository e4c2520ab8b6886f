/// Compute per-item support counts from encoded baskets.
/// `rows` holds the sorted item ids of each transaction, every id below
/// `n_items` as `BasketCollection` assigns them.
/// Returns a Vec where `result[item] = count of rows containing item`.
pub fn count_item_support(rows: &[Vec<u32>], n_items: usize) -> Vec<u64> {
    let mut counts = vec![0u64; n_items];
    for row in rows {
        for &item in row {
            counts[item as usize] += 1;
        }
    }
    counts
}

/// Smallest transaction count that satisfies `min_support` over `n_rows`.
///
/// Support is compared as a fraction (`count / n_rows >= min_support`), so the
/// float threshold is converted once here instead of per candidate.
pub fn min_count(min_support: f64, n_rows: usize) -> u64 {
    let n = n_rows as f64;
    let meets = |count: u64| count as f64 / n >= min_support;
    let mut count = ((min_support * n).ceil() as u64).max(1);
    // the product can land a hair off an integer either way
    while count > 1 && meets(count - 1) {
        count -= 1;
    }
    while count < n_rows as u64 && !meets(count) {
        count += 1;
    }
    count
}
