use crate::model::reading::{Reading, Series};
use crate::model::summary::{DailyDelta, MonthlySummary};
use crate::report::Reporter;
use crate::repository::SeriesRepository;
use crate::service::normalizer::{aggregate_monthly, compute_deltas, fill_gaps, latest_value, max_daily_delta};
use crate::source::ReadingSource;
use crate::time::{format_record_date, window_ending};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

/// Everything the renderers need, recomputed from the stored history.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Dense cumulative counts over the window.
    pub window: Series,
    pub daily: Vec<DailyDelta>,
    /// Monthly roll-up of the whole history, total row last.
    pub monthly: Vec<MonthlySummary>,
    /// Latest stored cumulative count.
    pub latest: u64,
    pub max_daily: i64,
    pub readings: usize,
    pub rejected: usize,
}

impl Report {
    pub fn window_days(&self) -> usize {
        self.daily.len()
    }

    pub fn monthly_total(&self) -> i64 {
        self.monthly
            .iter()
            .find(|m| m.is_total())
            .map(|m| m.total)
            .unwrap_or(0)
    }

    pub fn months(&self) -> impl Iterator<Item = &MonthlySummary> {
        self.monthly.iter().filter(|m| !m.is_total())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Recorded { count: u64, replaced: Option<u64> },
    /// The source had nothing for us; stored history is used as is.
    Unavailable { reason: String },
}

pub struct ReportUseCase<'a, R: SeriesRepository> {
    repo: &'a R,
    reporter: &'a dyn Reporter,
}

impl<'a, R: SeriesRepository> ReportUseCase<'a, R> {
    pub fn new(repo: &'a R, reporter: &'a dyn Reporter) -> Self {
        Self { repo, reporter }
    }

    /// Fetches today's count and stores it. A failing source is not an error.
    pub fn refresh(&self, source: &dyn ReadingSource, today: NaiveDate) -> Result<RefreshOutcome> {
        match source.fetch() {
            Ok(count) => {
                self.reporter.info(&format!("fetched download count {}", count));
                let replaced = self
                    .repo
                    .upsert(Reading::new(today, count), self.reporter)
                    .with_context(|| format!("Failed to store reading for {}", format_record_date(today)))?;
                Ok(RefreshOutcome::Recorded { count, replaced })
            }
            Err(e) => {
                self.reporter.warn(&format!(
                    "download count not available, keeping stored history: {}",
                    e
                ));
                Ok(RefreshOutcome::Unavailable { reason: e.to_string() })
            }
        }
    }

    pub fn build(&self, today: NaiveDate, window_days: u32) -> Result<Report> {
        let (window_start, window_end) = window_ending(today, window_days)
            .ok_or_else(|| anyhow!("The chart window must cover at least one day"))?;

        let loaded = self.repo.load(self.reporter).context("Failed to load download history")?;
        let series = loaded.series;

        // The history range always contains the window, and gap filling is
        // per date, so the window is a slice of the history.
        let history_start = series
            .first()
            .map(|r| r.date)
            .filter(|d| *d < window_start)
            .unwrap_or(window_start);
        let history = fill_gaps(&series, history_start, window_end, self.reporter);
        let history_deltas = compute_deltas(&history, self.reporter);
        let monthly = aggregate_monthly(&history_deltas);

        let window: Series = history.iter().filter(|r| r.date >= window_start).collect();
        let daily: Vec<DailyDelta> = history_deltas
            .iter()
            .filter(|d| d.date >= window_start)
            .enumerate()
            .map(|(i, d)| DailyDelta {
                date: d.date,
                // nothing before the window to compare against
                delta: if i == 0 { 0 } else { d.delta },
            })
            .collect();

        let report = Report {
            window_start,
            window_end,
            max_daily: max_daily_delta(&daily),
            latest: latest_value(&series),
            readings: series.len(),
            rejected: loaded.rejected,
            window,
            daily,
            monthly,
        };

        self.reporter.info(&format!(
            "report {}..{}: {} readings, latest {}, max per day {}, all-time total {}",
            format_record_date(window_start),
            format_record_date(window_end),
            report.readings,
            report.latest,
            report.max_daily,
            report.monthly_total()
        ));
        Ok(report)
    }
}
