pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod repository;
pub mod service;
pub mod source;
pub mod time;
pub mod usecase;

pub use config::Config;
pub use error::{FetchError, RecordError, StoreError};
pub use model::reading::{Reading, Series};
pub use model::summary::{DailyDelta, MonthKey, MonthlySummary};
pub use report::{RecordingReporter, Reporter, Severity, TracingReporter};
pub use repository::{FileSeriesRepository, LoadedSeries, SeriesRepository};
pub use service::normalizer::{aggregate_monthly, compute_deltas, fill_gaps, latest_value};
pub use source::{GalaxySource, ReadingSource};
pub use time::{format_record_date, parse_record_date};
pub use usecase::report::{RefreshOutcome, Report, ReportUseCase};
