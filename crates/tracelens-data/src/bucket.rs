//! Named accumulators shared by both analyzers.
//!
//! A [`Bucket`] only ever grows: `count`, `total_duration` and
//! `max_duration` always describe exactly the records routed into it.
//! Ranking happens once, after the pass, through the sorted views on
//! [`BucketMap`].

use indexmap::IndexMap;

// ── Bucket ────────────────────────────────────────────────────────────────────

/// Running counters for one classification label.
///
/// `T` is the per-record payload kept alongside the counters. Use `()` when
/// only the counters matter; a `Vec<()>` never allocates.
#[derive(Debug, Clone)]
pub struct Bucket<T = ()> {
    pub count: u64,
    /// Sum of recorded durations, in the source unit.
    pub total_duration: f64,
    /// Largest recorded duration, `0.0` while empty.
    pub max_duration: f64,
    pub records: Vec<T>,
}

impl<T> Default for Bucket<T> {
    fn default() -> Self {
        Self {
            count: 0,
            total_duration: 0.0,
            max_duration: 0.0,
            records: Vec::new(),
        }
    }
}

impl<T> Bucket<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one matching record.
    pub fn record(&mut self, duration: f64, item: T) {
        self.count += 1;
        self.total_duration += duration;
        if duration > self.max_duration {
            self.max_duration = duration;
        }
        self.records.push(item);
    }

    /// Average duration, `0.0` for an empty bucket.
    pub fn mean_duration(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_duration / self.count as f64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

// ── BucketMap ─────────────────────────────────────────────────────────────────

/// Buckets keyed by label, iterated in first-seen order.
///
/// First-seen order is the tie-breaker for every sorted view, so two runs
/// over the same input always rank identically.
#[derive(Debug, Clone)]
pub struct BucketMap<T = ()> {
    buckets: IndexMap<String, Bucket<T>>,
}

impl<T> Default for BucketMap<T> {
    fn default() -> Self {
        Self {
            buckets: IndexMap::new(),
        }
    }
}

impl<T> BucketMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one record into the bucket for `key`, creating it on first use.
    pub fn record(&mut self, key: &str, duration: f64, item: T) {
        match self.buckets.get_mut(key) {
            Some(bucket) => bucket.record(duration, item),
            None => {
                let mut bucket = Bucket::new();
                bucket.record(duration, item);
                self.buckets.insert(key.to_string(), bucket);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Bucket<T>> {
        self.buckets.get(key)
    }

    /// Buckets in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bucket<T>)> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of `count` over all buckets.
    pub fn total_count(&self) -> u64 {
        self.buckets.values().map(|b| b.count).sum()
    }

    /// Sum of `total_duration` over all buckets.
    pub fn total_duration(&self) -> f64 {
        self.buckets.values().map(|b| b.total_duration).sum()
    }

    /// Buckets ranked by descending total duration.
    pub fn sorted_by_total_desc(&self) -> Vec<(&str, &Bucket<T>)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.total_duration.total_cmp(&a.1.total_duration));
        sorted
    }

    /// Buckets ranked by descending count.
    pub fn sorted_by_count_desc(&self) -> Vec<(&str, &Bucket<T>)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.count.cmp(&a.1.count));
        sorted
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Bucket ────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_bucket_is_zeroed() {
        let bucket: Bucket<()> = Bucket::new();
        assert_eq!(bucket.count, 0);
        assert_eq!(bucket.total_duration, 0.0);
        assert_eq!(bucket.max_duration, 0.0);
        assert_eq!(bucket.mean_duration(), 0.0);
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_bucket_counters_match_records() {
        let mut bucket = Bucket::new();
        for dur in [3000.0, 12000.0, 500.0, 0.0] {
            bucket.record(dur, dur);
        }

        assert_eq!(bucket.count, bucket.records.len() as u64);
        assert_eq!(bucket.total_duration, bucket.records.iter().sum::<f64>());
        assert_eq!(bucket.max_duration, 12000.0);
        assert_eq!(bucket.mean_duration(), 15500.0 / 4.0);
    }

    #[test]
    fn test_bucket_zero_durations_keep_zero_max() {
        let mut bucket = Bucket::new();
        bucket.record(0.0, ());
        bucket.record(0.0, ());
        assert_eq!(bucket.count, 2);
        assert_eq!(bucket.max_duration, 0.0);
    }

    // ── BucketMap ─────────────────────────────────────────────────────────────

    #[test]
    fn test_bucket_map_preserves_first_seen_order() {
        let mut map = BucketMap::new();
        map.record("Paint", 1.0, ());
        map.record("Layout", 1.0, ());
        map.record("Paint", 1.0, ());
        map.record("RasterTask", 1.0, ());

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["Paint", "Layout", "RasterTask"]);
        assert_eq!(map.get("Paint").unwrap().count, 2);
        assert!(map.get("Composite").is_none());
    }

    #[test]
    fn test_bucket_map_totals() {
        let mut map = BucketMap::new();
        map.record("a", 10.0, ());
        map.record("b", 5.0, ());
        map.record("a", 2.5, ());

        assert_eq!(map.len(), 2);
        assert_eq!(map.total_count(), 3);
        assert_eq!(map.total_duration(), 17.5);
    }

    #[test]
    fn test_sorted_by_total_desc_breaks_ties_by_insertion() {
        let mut map = BucketMap::new();
        map.record("first", 10.0, ());
        map.record("second", 30.0, ());
        map.record("third", 10.0, ());

        let order: Vec<&str> = map.sorted_by_total_desc().into_iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["second", "first", "third"]);
    }

    #[test]
    fn test_sorted_by_count_desc_breaks_ties_by_insertion() {
        let mut map = BucketMap::new();
        map.record("x", 0.0, ());
        map.record("y", 0.0, ());
        map.record("y", 0.0, ());
        map.record("z", 0.0, ());

        let order: Vec<&str> = map.sorted_by_count_desc().into_iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["y", "x", "z"]);
    }

    #[test]
    fn test_sorted_views_are_repeatable() {
        let mut map = BucketMap::new();
        for (key, dur) in [("a", 1.0), ("b", 1.0), ("c", 1.0), ("b", 0.0)] {
            map.record(key, dur, ());
        }
        let first: Vec<&str> = map.sorted_by_total_desc().into_iter().map(|(k, _)| k).collect();
        let second: Vec<&str> = map.sorted_by_total_desc().into_iter().map(|(k, _)| k).collect();
        assert_eq!(first, second);
    }
}
