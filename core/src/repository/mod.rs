pub mod file;
pub mod traits;

// Re-export
pub use file::FileSeriesRepository;
pub use traits::{LoadedSeries, SeriesRepository};
