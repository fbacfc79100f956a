use crate::model::reading::{Reading, Series};
use crate::report::Reporter;
use anyhow::Result;

/// Readings as loaded from a store, plus how many stored records were unusable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedSeries {
    pub series: Series,
    pub rejected: usize,
}

pub trait SeriesRepository {
    /// Loads every usable reading. Malformed records are reported and skipped.
    fn load(&self, reporter: &dyn Reporter) -> Result<LoadedSeries>;
    /// Stores the reading, replacing any reading for the same date.
    /// Returns the replaced count.
    fn upsert(&self, reading: Reading, reporter: &dyn Reporter) -> Result<Option<u64>>;
}
