use std::collections::BTreeMap;

use crate::types::{Ratio, Sample};

/// Smallest and largest value currently held by a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extrema {
    pub min: Ratio,
    pub max: Ratio,
}

impl Extrema {
    /// `max - min`. Never negative because both come from the same set.
    pub fn spread(&self) -> Ratio {
        self.max.checked_sub(self.min).unwrap_or(Ratio::ZERO)
    }
}

/// Time-bounded history of samples keyed by tick timestamp (seconds).
///
/// One value per timestamp: a second insert for the same key replaces the
/// first. Extrema are recomputed by a full pass on demand, so evicting the
/// current min or max needs no bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct WindowStore {
    entries: BTreeMap<u64, Ratio>,
}

impl WindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry at `timestamp`.
    pub fn insert(&mut self, timestamp: u64, value: Ratio) {
        self.entries.insert(timestamp, value);
    }

    /// Drop every entry with `timestamp < cutoff`. Returns how many were removed.
    pub fn evict_older_than(&mut self, cutoff: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|ts, _| *ts >= cutoff);
        before - self.entries.len()
    }

    /// Full pass over the stored values. `None` when the window is empty.
    pub fn scan_extrema(&self) -> Option<Extrema> {
        let mut values = self.entries.values().copied();
        let first = values.next()?;

        let extrema = values.fold(
            Extrema {
                min: first,
                max: first,
            },
            |acc, v| Extrema {
                min: acc.min.min(v),
                max: acc.max.max(v),
            },
        );

        Some(extrema)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, timestamp: u64) -> bool {
        self.entries.contains_key(&timestamp)
    }

    /// Samples in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.entries.iter().map(|(&timestamp, &value)| Sample { timestamp, value })
    }
}
