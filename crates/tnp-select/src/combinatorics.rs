//! Cross-product index enumeration.

/// Enumerate every ordered index pair of two collections of sizes
/// `n1` and `n2`.
///
/// This is the full `n1 × n2` cross product: no deduplication, and
/// self-pairs are included when both sides refer to the same collection.
/// Pure enumeration; callers apply their own predicate and aggregation.
pub fn index_pairs(n1: usize, n2: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n1).flat_map(move |i| (0..n2).map(move |j| (i, j)))
}
