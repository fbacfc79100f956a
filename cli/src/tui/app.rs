use dlstats_core::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Daily,
    Monthly,
}

pub struct ChartEntry {
    pub label: String,
    pub value: i64,
}

pub struct StatsApp {
    pub report: Report,
    pub view: View,
}

impl StatsApp {
    pub fn new(report: Report) -> Self {
        Self {
            report,
            view: View::Daily,
        }
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Daily => View::Monthly,
            View::Monthly => View::Daily,
        };
    }

    pub fn title(&self) -> String {
        match self.view {
            View::Daily => format!(" Last {} Days ", self.report.window_days()),
            View::Monthly => " Monthly ".to_string(),
        }
    }

    pub fn entries(&self) -> Vec<ChartEntry> {
        match self.view {
            View::Daily => self
                .report
                .daily
                .iter()
                .map(|d| ChartEntry {
                    label: d.date.format("%m/%d").to_string(),
                    value: d.delta,
                })
                .collect(),
            View::Monthly => self
                .report
                .months()
                .map(|m| ChartEntry {
                    label: m.month.to_string(),
                    value: m.total,
                })
                .collect(),
        }
    }
}
