//! # Per-chromosome interval index
//!
//! [`GenomicIntervalIndex`] keeps one [`Lapper`] per contig and answers overlap queries
//! for inclusive coordinates: an entry `[s, e]` is returned for query `[qs, qe]` iff
//! `s <= qe && e >= qs`. `rust_lapper` works with half-open intervals, so ends are
//! shifted by one on the way in.
use std::collections::HashMap;

use rust_lapper::{Interval, Lapper};

use crate::cnv::GenomicInterval;

#[derive(Debug, Clone)]
pub struct GenomicIntervalIndex<V>
where
    V: Eq + Clone + Send + Sync,
{
    inner: HashMap<String, Lapper<u64, V>>,
}

impl<V> Default for GenomicIntervalIndex<V>
where
    V: Eq + Clone + Send + Sync,
{
    fn default() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }
}

impl<V> FromIterator<(GenomicInterval, V)> for GenomicIntervalIndex<V>
where
    V: Eq + Clone + Send + Sync,
{
    fn from_iter<T: IntoIterator<Item = (GenomicInterval, V)>>(iter: T) -> Self {
        let mut grouped: HashMap<String, Vec<Interval<u64, V>>> = HashMap::new();
        for (interval, value) in iter {
            let entry = to_lapper_interval(&interval, value);
            grouped.entry(interval.seqname).or_default().push(entry);
        }

        let inner = grouped
            .into_iter()
            .map(|(seqname, intervals)| (seqname, Lapper::new(intervals)))
            .collect();

        Self { inner }
    }
}

impl<V> GenomicIntervalIndex<V>
where
    V: Eq + Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` for `interval`. Entries are never deduplicated.
    /// Building through [`FromIterator`] is cheaper when all entries are known up front.
    pub fn insert(&mut self, interval: &GenomicInterval, value: V) {
        self.inner
            .entry(interval.seqname.clone())
            .or_insert_with(|| Lapper::new(vec![]))
            .insert(to_lapper_interval(interval, value));
    }

    /// All values whose interval overlaps `[start, end]` on `seqname`, ordered by start position.
    /// A contig that is not in the index has no overlaps.
    pub fn query(&self, seqname: &str, start: u64, end: u64) -> Vec<&V> {
        match self.inner.get(seqname) {
            Some(lapper) => lapper
                .find(start, end.saturating_add(1))
                .map(|iv| &iv.val)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn query_interval(&self, interval: &GenomicInterval) -> Vec<&V> {
        self.query(&interval.seqname, interval.start, interval.end)
    }

    pub fn len(&self) -> usize {
        self.inner.values().map(|lapper| lapper.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_chr(&self) -> usize {
        self.inner.len()
    }
}

fn to_lapper_interval<V>(interval: &GenomicInterval, value: V) -> Interval<u64, V>
where
    V: Eq + Clone + Send + Sync,
{
    Interval {
        start: interval.start,
        stop: interval.end.saturating_add(1),
        val: value,
    }
}
