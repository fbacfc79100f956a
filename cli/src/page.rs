use anyhow::Result;
use askama::Template;
use dlstats_core::Report;

pub const PAGE_FILE: &str = "index.html";

/// Format of the "Generated" stamp on the page.
pub const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M";

struct MonthRow {
    month: String,
    total: i64,
    is_total: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
struct StatusPage<'a> {
    title: &'a str,
    role: &'a str,
    generated_date: &'a str,
    description: &'a str,
    total_downloads: u64,
    daily_image: &'a str,
    monthly_image: &'a str,
    months: Vec<MonthRow>,
}

pub struct PageContext<'a> {
    pub title: &'a str,
    pub role: &'a str,
    pub generated_date: &'a str,
    pub description: &'a str,
    pub daily_image: &'a str,
    pub monthly_image: &'a str,
}

pub fn render(report: &Report, ctx: &PageContext<'_>) -> Result<String> {
    let months = report
        .monthly
        .iter()
        .map(|m| MonthRow {
            month: m.month.to_string(),
            total: m.total,
            is_total: m.is_total(),
        })
        .collect();

    let page = StatusPage {
        title: ctx.title,
        role: ctx.role,
        generated_date: ctx.generated_date,
        description: ctx.description,
        total_downloads: report.latest,
        daily_image: ctx.daily_image,
        monthly_image: ctx.monthly_image,
        months,
    };
    Ok(page.render()?)
}
