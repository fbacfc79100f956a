use chrono::NaiveDate;
use std::fmt;

/// Downloads on a single day: the change of the cumulative counter
/// against the previous day. Negative when the counter went backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyDelta {
    pub date: NaiveDate,
    pub delta: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MonthKey {
    Month { year: i32, month: u32 },
    /// Synthetic row summing every month.
    Total,
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthKey::Month { year, month } => write!(f, "{:04}/{:02}", year, month),
            MonthKey::Total => write!(f, "Total Result"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub total: i64,
}

impl MonthlySummary {
    pub fn is_total(&self) -> bool {
        self.month == MonthKey::Total
    }
}
