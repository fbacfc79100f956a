use dlstats_core::Report;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct DailyRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Downloads (total)")]
    count: u64,
    #[tabled(rename = "Downloads (day)")]
    delta: i64,
}

#[derive(Tabled)]
struct MonthlyRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Downloads")]
    total: i64,
}

fn daily_rows(report: &Report) -> Vec<DailyRow> {
    report
        .window
        .iter()
        .zip(report.daily.iter())
        .map(|(reading, day)| DailyRow {
            date: day.date.format("%Y-%m-%d (%a)").to_string(),
            count: reading.count,
            delta: day.delta,
        })
        .collect()
}

fn monthly_rows(report: &Report) -> Vec<MonthlyRow> {
    report
        .monthly
        .iter()
        .map(|m| MonthlyRow {
            month: m.month.to_string(),
            total: m.total,
        })
        .collect()
}

fn styled(rows: Table) -> Table {
    let mut table = rows;
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN)); // Header color
    table
}

pub fn show_report(report: &Report) {
    println!(
        "\n\x1b[1;36mLast {} days\x1b[0m ({} .. {})",
        report.window_days(),
        report.window_start.format("%Y-%m-%d"),
        report.window_end.format("%Y-%m-%d")
    );
    println!("{}", styled(Table::new(daily_rows(report))));

    println!("\n\x1b[1;36mMonthly\x1b[0m");
    println!("{}", styled(Table::new(monthly_rows(report))));

    println!(
        "\nTotal Downloads: {}    Max downloads per day: {}",
        report.latest, report.max_daily
    );
    if report.rejected > 0 {
        println!("Skipped {} malformed stored records.", report.rejected);
    }
}
