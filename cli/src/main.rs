mod chart;
mod logging;
mod page;
mod table;
mod tui;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use clap::Parser;
use dlstats_core::{
    time, Config, FileSeriesRepository, GalaxySource, RefreshOutcome, Report, ReportUseCase,
    Reporter, TracingReporter,
};

#[derive(Parser)]
#[command(name = "dlstats")]
#[command(about = "Track a download counter and chart its daily and monthly growth", long_about = None)]
struct Cli {
    /// Config file (default: ./dlstats.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Series store, overrides `data_file`
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Directory for charts and the status page, overrides `output_dir`
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Render charts and the status page (default)
    Run {
        /// Fetch today's count before rendering
        #[arg(long)]
        fetch: bool,
        /// Days in the daily chart
        #[arg(long)]
        days: Option<u32>,
    },
    /// Fetch today's count and store it
    Fetch,
    /// Print the daily and monthly tables
    Show {
        #[arg(long)]
        days: Option<u32>,
    },
    /// Browse the charts in the terminal
    Tui {
        #[arg(long)]
        days: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_file = data;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let reporter = TracingReporter;
    let repo = FileSeriesRepository::new(config.data_file.clone());
    let usecase = ReportUseCase::new(&repo, &reporter);
    let today = time::today();

    match cli.command.unwrap_or(Commands::Run { fetch: false, days: None }) {
        Commands::Run { fetch, days } => {
            if fetch {
                refresh(&usecase, &config, today)?;
            }
            let report = usecase.build(today, days.unwrap_or(config.window_days))?;
            let generated = Local::now().format(page::GENERATED_FORMAT).to_string();
            let written = publish(&report, &config, &generated, &reporter);
            if written == 0 {
                bail!("No output could be written to {}", config.output_dir.display());
            }
        }
        Commands::Fetch => {
            if let RefreshOutcome::Unavailable { reason } = refresh(&usecase, &config, today)? {
                bail!("Download count not available: {}", reason);
            }
        }
        Commands::Show { days } => {
            let report = usecase.build(today, days.unwrap_or(config.window_days))?;
            table::show_report(&report);
        }
        Commands::Tui { days } => {
            let report = usecase.build(today, days.unwrap_or(config.window_days))?;
            tui::run(report)?;
        }
    }
    Ok(())
}

fn refresh(
    usecase: &ReportUseCase<'_, FileSeriesRepository>,
    config: &Config,
    today: chrono::NaiveDate,
) -> Result<RefreshOutcome> {
    let source = GalaxySource::new(config.galaxy_command.clone(), config.role.clone());
    usecase.refresh(&source, today)
}

/// Writes both charts and the page. Each artifact is independent; returns
/// how many were written.
fn publish(report: &Report, config: &Config, generated: &str, reporter: &dyn Reporter) -> usize {
    let out = &config.output_dir;
    let description = config.description();
    let ctx = page::PageContext {
        title: &config.page_title,
        role: &config.role,
        generated_date: generated,
        description: &description,
        daily_image: chart::DAILY_CHART_FILE,
        monthly_image: chart::MONTHLY_CHART_FILE,
    };

    let artifacts: [(PathBuf, Result<String>); 3] = [
        (
            out.join(chart::DAILY_CHART_FILE),
            chart::render(&chart::daily_chart(report)),
        ),
        (
            out.join(chart::MONTHLY_CHART_FILE),
            chart::render(&chart::monthly_chart(report)),
        ),
        (out.join(page::PAGE_FILE), page::render(report, &ctx)),
    ];

    let mut written = 0;
    for (path, rendered) in artifacts {
        match rendered.and_then(|content| write_artifact(&path, &content)) {
            Ok(()) => {
                reporter.info(&format!("wrote {}", path.display()));
                written += 1;
            }
            Err(e) => reporter.warn(&format!("could not write {}: {:#}", path.display(), e)),
        }
    }
    written
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("{} has no parent directory", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlstats_core::{Reading, RecordingReporter, SeriesRepository};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_run_with_fetch() {
        let cli = Cli::try_parse_from(["dlstats", "--data", "x.json", "run", "--fetch", "--days", "7"]).unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("x.json")));
        assert!(matches!(cli.command, Some(Commands::Run { fetch: true, days: Some(7) })));
    }

    #[test]
    fn test_publish_writes_all_artifacts_identically_twice() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_file: dir.path().join("data/download_counts.json"),
            output_dir: dir.path().join("docs"),
            ..Config::default()
        };
        let reporter = RecordingReporter::new();
        let repo = FileSeriesRepository::new(config.data_file.clone());
        let today = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        repo.upsert(Reading::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 100), &reporter).unwrap();
        repo.upsert(Reading::new(today, 130), &reporter).unwrap();

        let usecase = ReportUseCase::new(&repo, &reporter);
        let report = usecase.build(today, 3).unwrap();
        assert_eq!(publish(&report, &config, "2024-01-03 10:00", &reporter), 3);
        let first = fs::read_to_string(config.output_dir.join(chart::DAILY_CHART_FILE)).unwrap();

        let again = usecase.build(today, 3).unwrap();
        assert_eq!(publish(&again, &config, "2024-01-03 10:00", &reporter), 3);
        let second = fs::read_to_string(config.output_dir.join(chart::DAILY_CHART_FILE)).unwrap();

        assert_eq!(first, second);
        assert!(config.output_dir.join(page::PAGE_FILE).exists());
        assert!(config.output_dir.join(chart::MONTHLY_CHART_FILE).exists());
    }

    #[test]
    fn test_publish_reports_unwritable_output() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("docs");
        fs::write(&blocker, "not a directory").unwrap();
        let config = Config { output_dir: blocker, ..Config::default() };
        let reporter = RecordingReporter::new();

        let day = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let report = Report {
            window_start: day,
            window_end: day,
            window: Default::default(),
            daily: vec![],
            monthly: vec![],
            latest: 0,
            max_daily: 0,
            readings: 0,
            rejected: 0,
        };
        assert_eq!(publish(&report, &config, "now", &reporter), 0);
        assert_eq!(reporter.warnings().len(), 3);
    }
}
