//! Shard partitioning

use std::ops::Range;

/// Contiguous shard ranges covering `0..len`
///
/// Every shard but the last holds `len / workers` items; the last one also
/// takes the remainder. `workers` is clamped to at least 1.
pub fn shard_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let per_worker = len / workers;
    (0..workers)
        .map(|i| {
            let start = i * per_worker;
            let end = if i == workers - 1 {
                len
            } else {
                start + per_worker
            };
            start..end
        })
        .collect()
}

/// Split `items` into owned shards following [`shard_ranges`]
pub fn split_into_shards<T>(mut items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    let ranges = shard_ranges(items.len(), workers);
    let mut shards = Vec::with_capacity(ranges.len());
    for range in ranges.iter().rev() {
        shards.push(items.split_off(range.start));
    }
    shards.reverse();
    shards
}
