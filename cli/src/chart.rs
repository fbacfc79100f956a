//! SVG bar charts for the daily window and the monthly roll-up.

use anyhow::Result;
use askama::Template;
use dlstats_core::{format_record_date, Report};

const WIDTH: f64 = 1500.0;
const HEIGHT: f64 = 800.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 140.0;

const POSITIVE_FILL: &str = "#1f3fbf";
const NEGATIVE_FILL: &str = "#c62828";

pub const DAILY_CHART_FILE: &str = "download_counts.svg";
pub const MONTHLY_CHART_FILE: &str = "monthly_download_counts.svg";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    pub value: i64,
    pub show_label: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub annotations: Vec<String>,
    pub bars: Vec<ChartBar>,
}

/// Last N days of deltas; every second date is labelled.
pub fn daily_chart(report: &Report) -> ChartSpec {
    ChartSpec {
        title: format!(
            "Download Count Differences for the Last {} Days",
            report.window_days()
        ),
        x_label: "Date".to_string(),
        y_label: "Download Count Difference".to_string(),
        annotations: vec![
            format!("Total Downloads: {}", report.latest),
            format!("Max downloads per day: {}", report.max_daily),
        ],
        bars: report
            .daily
            .iter()
            .enumerate()
            .map(|(i, day)| ChartBar {
                label: format_record_date(day.date),
                value: day.delta,
                show_label: i % 2 == 0,
            })
            .collect(),
    }
}

/// One bar per month; the total row goes into the annotations.
pub fn monthly_chart(report: &Report) -> ChartSpec {
    ChartSpec {
        title: "Monthly Downloads".to_string(),
        x_label: "Month".to_string(),
        y_label: "Downloads".to_string(),
        annotations: vec![
            format!("Total Downloads: {}", report.latest),
            format!("Total Result: {}", report.monthly_total()),
        ],
        bars: report
            .months()
            .map(|m| ChartBar {
                label: m.month.to_string(),
                value: m.total,
                show_label: true,
            })
            .collect(),
    }
}

struct BarGeometry {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    center: f64,
    value_y: f64,
    value_text: String,
    label: String,
    show_label: bool,
    fill: &'static str,
}

struct Tick {
    y: f64,
    text: String,
}

struct Annotation {
    x: f64,
    y: f64,
    box_width: f64,
    text: String,
}

#[derive(Template)]
#[template(path = "bar_chart.svg", escape = "html")]
struct BarChartSvg {
    width: f64,
    height: f64,
    title: String,
    title_x: f64,
    x_label: String,
    y_label: String,
    axis_label_y: f64,
    plot_left: f64,
    plot_right: f64,
    plot_top: f64,
    plot_bottom: f64,
    zero_y: f64,
    label_y: f64,
    ticks: Vec<Tick>,
    bars: Vec<BarGeometry>,
    annotations: Vec<Annotation>,
}

/// Maps values onto the vertical pixel range of the plot area.
#[derive(Debug, Clone, Copy)]
struct ValueScale {
    low: f64,
    high: f64,
    top: f64,
    bottom: f64,
}

impl ValueScale {
    /// Always includes zero; 10% headroom above the largest value.
    fn new(values: &[i64], top: f64, bottom: f64) -> Self {
        let min = values.iter().copied().min().unwrap_or(0).min(0) as f64;
        let max = values.iter().copied().max().unwrap_or(0).max(0) as f64;
        let high = if max > min { max + (max - min) * 0.1 } else { min + 1.0 };
        Self {
            low: min,
            high,
            top,
            bottom,
        }
    }

    fn y(&self, value: f64) -> f64 {
        self.bottom - (value - self.low) / (self.high - self.low) * (self.bottom - self.top)
    }

    /// Tick values on a 1/2/5 step, at least 1 apart.
    fn ticks(&self) -> Vec<f64> {
        let raw = (self.high - self.low) / 8.0;
        let magnitude = 10f64.powf(raw.log10().floor());
        let normalized = raw / magnitude;
        let nice = if normalized <= 1.0 {
            1.0
        } else if normalized <= 2.0 {
            2.0
        } else if normalized <= 5.0 {
            5.0
        } else {
            10.0
        };
        let step = (nice * magnitude).max(1.0);

        let mut ticks = Vec::new();
        let mut value = (self.low / step).ceil() * step;
        while value <= self.high {
            ticks.push(value);
            value += step;
        }
        ticks
    }
}

pub fn render(spec: &ChartSpec) -> Result<String> {
    let plot_left = MARGIN_LEFT;
    let plot_right = WIDTH - MARGIN_RIGHT;
    let plot_top = MARGIN_TOP;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;

    let values: Vec<i64> = spec.bars.iter().map(|b| b.value).collect();
    let scale = ValueScale::new(&values, plot_top, plot_bottom);
    let zero_y = scale.y(0.0);

    let slot = if spec.bars.is_empty() {
        0.0
    } else {
        (plot_right - plot_left) / spec.bars.len() as f64
    };
    let bars = spec
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let value_y = scale.y(bar.value as f64);
            let x = plot_left + slot * i as f64 + slot * 0.1;
            BarGeometry {
                x,
                y: value_y.min(zero_y),
                width: slot * 0.8,
                height: (value_y - zero_y).abs(),
                center: x + slot * 0.4,
                value_y: if bar.value < 0 { value_y + 14.0 } else { value_y - 4.0 },
                value_text: bar.value.to_string(),
                label: bar.label.clone(),
                show_label: bar.show_label,
                fill: if bar.value < 0 { NEGATIVE_FILL } else { POSITIVE_FILL },
            }
        })
        .collect();

    let ticks = scale
        .ticks()
        .into_iter()
        .map(|value| Tick {
            y: scale.y(value),
            text: format!("{}", value.round() as i64),
        })
        .collect();

    let annotations = spec
        .annotations
        .iter()
        .enumerate()
        .map(|(i, text)| Annotation {
            x: plot_left + 16.0,
            y: plot_top + 24.0 + 28.0 * i as f64,
            box_width: text.chars().count() as f64 * 8.0 + 12.0,
            text: text.clone(),
        })
        .collect();

    let svg = BarChartSvg {
        width: WIDTH,
        height: HEIGHT,
        title: spec.title.clone(),
        title_x: (plot_left + plot_right) / 2.0,
        x_label: spec.x_label.clone(),
        y_label: spec.y_label.clone(),
        axis_label_y: (plot_top + plot_bottom) / 2.0,
        plot_left,
        plot_right,
        plot_top,
        plot_bottom,
        zero_y,
        label_y: plot_bottom + 16.0,
        ticks,
        bars,
        annotations,
    };
    Ok(svg.render()?)
}
