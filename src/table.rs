use rustc_hash::FxHashMap;

use crate::parse::ScaledInt;

/// Running statistics for one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aggregate {
    pub min: ScaledInt,
    pub max: ScaledInt,
    pub sum: i64,
    pub count: u64,
}

impl Aggregate {
    fn new(value: ScaledInt) -> Self {
        Self {
            min: value,
            max: value,
            sum: value as i64,
            count: 1,
        }
    }

    #[inline]
    fn record(&mut self, value: ScaledInt) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value as i64;
        self.count += 1;
    }

    /// Folds `other` in. Commutative and associative.
    pub fn merge(&mut self, other: &Aggregate) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }
}

/// Key to [`Aggregate`] map. Keys are the raw bytes between the start of a
/// record and its `;`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregationTable {
    entries: FxHashMap<Box<[u8]>, Aggregate>,
}

impl AggregationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation. The key is copied only the first time it is seen.
    #[inline]
    pub fn record(&mut self, key: &[u8], value: ScaledInt) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.record(value);
        } else {
            self.entries.insert(key.into(), Aggregate::new(value));
        }
    }

    /// Moves every entry of `other` into `self`, merging keys present in both.
    pub fn merge(&mut self, other: AggregationTable) {
        if self.entries.is_empty() {
            self.entries = other.entries;
            return;
        }
        self.entries.reserve(other.entries.len());
        for (key, stats) in other.entries {
            self.entries
                .entry(key)
                .and_modify(|e| e.merge(&stats))
                .or_insert(stats);
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Aggregate> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Aggregate)> {
        self.entries.iter().map(|(k, v)| (&**k, v))
    }

    /// Entries ordered by key bytes.
    pub fn into_sorted(self) -> Vec<(Box<[u8]>, Aggregate)> {
        let mut entries: Vec<_> = self.entries.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
