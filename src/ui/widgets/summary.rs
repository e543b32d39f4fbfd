// src/ui/widgets/summary.rs

use super::analysis_view::severity_style;
use crate::app::{App, AppState, SPINNER_CHARS};
use crate::core::models::Severity;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};
use strum::IntoEnumIterator;

/// Renders the run status, the posture score and the per-severity counts of
/// the shown report.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Run status
            Constraint::Length(1), // Spacer
            Constraint::Length(3), // Score & rating
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Findings by level
        ])
        .split(area);

    // --- Run Status ---
    let status_line = if app.status.running {
        Line::from(vec![
            Span::styled(format!("{} ", SPINNER_CHARS[app.spinner_frame]), Style::default().fg(Color::Cyan)),
            Span::styled("Running", Style::default().fg(Color::Cyan)),
        ])
    } else {
        Line::from(Span::styled("Idle", Style::default().fg(Color::Green)))
    };
    let last_line = match app.status.last_completed {
        Some(t) => Line::from(format!("Last run: {}", t.format("%Y-%m-%d %H:%M:%S"))),
        None => Line::from("Last run: never"),
    };
    let status_text = Text::from(vec![Line::from("SCAN STATUS".bold()), status_line, last_line]);
    frame.render_widget(Paragraph::new(status_text), summary_chunks[0]);

    if !matches!(app.state, AppState::Finished) || app.report.is_none() {
        return;
    }

    // --- Score & Rating ---
    let score = app.summary.score;
    let (rating_text, rating_style) = match score {
        90..=100 => ("Hardened", Style::default().fg(Color::Green)),
        75..=89 => ("Good", Style::default().fg(Color::Cyan)),
        50..=74 => ("Needs Improvement", Style::default().fg(Color::Yellow)),
        _ => ("Poor", Style::default().fg(Color::Red)),
    };
    let score_line = Line::from(format!("{}/100 ({})", score, rating_text)).style(rating_style);
    let score_text = Text::from(vec![Line::from("Overall Score".bold()), score_line]);
    frame.render_widget(Paragraph::new(score_text).alignment(Alignment::Center), summary_chunks[2]);

    let score_gauge = Gauge::default().percent(score as u16).label("").style(Style::default().fg(
        if score >= 80 {
            Color::Green
        } else if score >= 50 {
            Color::Yellow
        } else {
            Color::Red
        },
    ));
    frame.render_widget(score_gauge, summary_chunks[3]);

    // --- Findings by level ---
    let mut lines = vec![Line::from("FINDINGS".bold())];
    for severity in Severity::iter() {
        lines.push(Line::from(vec![
            Span::raw(format!("{:<10}", severity.to_string())),
            Span::styled(app.summary.count(severity).to_string(), severity_style(severity)),
        ]));
    }
    let total = app.report.as_ref().map_or(0, |r| r.total_findings);
    lines.push(Line::from(format!("{:<10}{}", "TOTAL", total)));
    frame.render_widget(Paragraph::new(lines), summary_chunks[5]);
}
