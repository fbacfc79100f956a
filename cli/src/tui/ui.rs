use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Padding, Paragraph},
};

use crate::tui::app::StatsApp;

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    up: Color,
    down: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    up: Color::Green,
    down: Color::Red,
};

pub fn draw(frame: &mut Frame, app: &StatsApp) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Chart + sidebar
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    let header = Paragraph::new(Span::styled(
        "DOWNLOAD STATS",
        Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
    ))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(THEME.muted))
            .padding(Padding::new(0, 0, 1, 0)),
    );
    frame.render_widget(header, main_layout[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(75), // Chart
            Constraint::Length(1),      // Gutter
            Constraint::Percentage(25), // Summary
        ])
        .split(main_layout[1]);

    draw_chart(frame, app, content[0]);
    draw_summary(frame, app, content[2]);

    let help = Line::from(vec![
        Span::styled("VIEW: ", Style::default().fg(THEME.muted)),
        Span::styled("tab ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), main_layout[2]);
}

fn draw_chart(frame: &mut Frame, app: &StatsApp, area: Rect) {
    let entries = app.entries();
    // Bars are unsigned; a decrease is drawn as its magnitude in red.
    let bars: Vec<Bar> = entries
        .iter()
        .map(|entry| {
            Bar::default()
                .label(Line::from(entry.label.clone()))
                .value(entry.value.unsigned_abs())
                .text_value(entry.value.to_string())
                .style(Style::default().fg(if entry.value < 0 { THEME.down } else { THEME.up }))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(THEME.muted))
                .title(app.title()),
        )
        .bar_width(7)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn draw_summary(frame: &mut Frame, app: &StatsApp, area: Rect) {
    let report = &app.report;
    let lines = vec![
        Line::from(Span::styled("Overview", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Total:       ", Style::default().fg(THEME.muted)),
            Span::styled(report.latest.to_string(), Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("Max per day: ", Style::default().fg(THEME.muted)),
            Span::styled(report.max_daily.to_string(), Style::default().fg(THEME.up)),
        ]),
        Line::from(vec![
            Span::styled("All months:  ", Style::default().fg(THEME.muted)),
            Span::styled(report.monthly_total().to_string(), Style::default().fg(THEME.text)),
        ]),
        Line::from(vec![
            Span::styled("Readings:    ", Style::default().fg(THEME.muted)),
            Span::styled(report.readings.to_string(), Style::default().fg(THEME.text)),
        ]),
    ];

    let summary = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(THEME.muted))
            .title(" Summary "),
    );
    frame.render_widget(summary, area);
}
