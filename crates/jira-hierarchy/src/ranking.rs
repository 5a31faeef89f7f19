//! Rank, stably sort, then truncate.

/// Sort `items` by `rank` and keep at most `limit` of them.
///
/// The sort is stable: items with equal rank keep their input order, so
/// callers can encode a secondary order (such as registration order) simply
/// by how they produce the items. `None` keeps everything.
pub fn rank_and_truncate<T, K, F>(mut items: Vec<T>, rank: F, limit: Option<usize>) -> Vec<T>
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    items.sort_by_key(rank);
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}
