use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Largest count the store and the fetch step accept, so that any difference
/// of two counts fits in an `i64` delta.
pub const MAX_COUNT: u64 = i64::MAX as u64;

/// One sample of the cumulative download counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub date: NaiveDate,
    pub count: u64,
}

impl Reading {
    pub fn new(date: NaiveDate, count: u64) -> Self {
        Self { date, count }
    }
}

/// Cumulative readings ordered by date, at most one per calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Series {
    readings: BTreeMap<NaiveDate, u64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the reading for its date.
    /// Returns the count it replaced, if the date was already recorded.
    pub fn upsert(&mut self, reading: Reading) -> Option<u64> {
        self.readings.insert(reading.date, reading.count)
    }

    pub fn get(&self, date: NaiveDate) -> Option<u64> {
        self.readings.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn first(&self) -> Option<Reading> {
        self.readings
            .iter()
            .next()
            .map(|(date, count)| Reading::new(*date, *count))
    }

    pub fn last(&self) -> Option<Reading> {
        self.readings
            .iter()
            .next_back()
            .map(|(date, count)| Reading::new(*date, *count))
    }

    /// Most recent reading on or before `date`.
    pub fn latest_on_or_before(&self, date: NaiveDate) -> Option<Reading> {
        self.readings
            .range(..=date)
            .next_back()
            .map(|(date, count)| Reading::new(*date, *count))
    }

    /// Arithmetic mean of the recorded counts, rounded half up.
    pub fn mean_count(&self) -> Option<u64> {
        if self.readings.is_empty() {
            return None;
        }
        let len = self.readings.len() as u128;
        let sum: u128 = self.readings.values().map(|c| *c as u128).sum();
        Some(((sum + len / 2) / len) as u64)
    }

    pub fn iter(&self) -> impl Iterator<Item = Reading> + '_ {
        self.readings
            .iter()
            .map(|(date, count)| Reading::new(*date, *count))
    }

    pub fn counts(&self) -> Vec<u64> {
        self.readings.values().copied().collect()
    }
}

impl FromIterator<Reading> for Series {
    /// Later readings for the same date win.
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        let mut series = Series::new();
        for reading in iter {
            series.upsert(reading);
        }
        series
    }
}
