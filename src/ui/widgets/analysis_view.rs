// src/ui/widgets/analysis_view.rs

use crate::app::{App, AppState, Pane, SPINNER_CHARS};
use crate::core::models::{Finding, Severity};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Severity::High => Style::default().fg(Color::LightRed),
        Severity::Medium => Style::default().fg(Color::Yellow),
        Severity::Low => Style::default().fg(Color::Cyan),
        Severity::Error => Style::default().fg(Color::Magenta),
    }
}

pub fn render_analysis_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = match &app.report {
        Some(report) if app.viewing_historical => format!(
            "Historical Scan {} - {} ({})",
            report.scan_id.as_deref().unwrap_or("?"),
            report.scan_target,
            report.scan_date
        ),
        Some(report) => format!("Latest Scan - {} ({})", report.scan_target, report.scan_date),
        None => "Analysis Report".to_string(),
    };
    let border_style = if app.pane == Pane::Findings { Style::default().fg(Color::Yellow) } else { Style::default() };
    let main_block = Block::default().borders(Borders::ALL).border_style(border_style).title(title);

    let report = match (&app.state, &app.report) {
        (AppState::Finished, Some(report)) => report,
        (state, _) => {
            let content = if matches!(state, AppState::Scanning) || app.status.running {
                let spinner_char = SPINNER_CHARS[app.spinner_frame];
                Paragraph::new(Line::from(vec![
                    Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
                    Span::raw("Scanning... Please wait."),
                ]))
            } else {
                Paragraph::new("Fill in the target and press Enter to start an audit.")
            };
            frame.render_widget(content.alignment(Alignment::Center).block(main_block), area);
            return;
        }
    };

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(0)])
        .split(inner_area);

    let items: Vec<ListItem> = report
        .findings
        .iter()
        .map(|f| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", f.category), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:<8} ", f.level), severity_style(f.level)),
                Span::raw(f.issue.lines().next().unwrap_or_default().to_string()),
            ]))
        })
        .collect();

    let findings_list = List::new(items).highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(findings_list, chunks[0], &mut app.findings_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    let selected = app.findings_state.selected().and_then(|i| report.findings.get(i));
    match selected {
        Some(finding) => {
            let p = Paragraph::new(detail_lines(finding)).wrap(Wrap { trim: true }).block(detail_block);
            frame.render_widget(p, chunks[1]);
        }
        None => render_placeholder_details(frame, app, detail_block, chunks[1]),
    }
}

fn detail_lines(finding: &Finding) -> Vec<Line<'_>> {
    let mut lines = vec![
        Line::from(""),
        Line::from("ISSUE:".yellow().bold()),
    ];
    lines.extend(finding.issue.lines().map(Line::from));
    if !finding.recommendation.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from("HOW TO FIX:".yellow().bold()));
        lines.push(Line::from(finding.recommendation.as_str()));
    }
    if !finding.compliance.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from("COMPLIANCE:".yellow().bold()));
        for (framework, reference) in &finding.compliance {
            lines.push(Line::from(vec![Span::styled(format!("{}: ", framework), Style::default().bold()), Span::raw(reference.as_str())]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Detected {}", finding.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn render_placeholder_details(frame: &mut Frame, app: &App, block: Block, area: Rect) {
    let placeholder_text = if app.summary.issues() == 0 {
        Text::from(vec![
            Line::from(""),
            Line::from("✓ NO SIGNIFICANT ISSUES".bold().fg(Color::Green)),
            Line::from(""),
            Line::from("No critical, high or medium findings on this target."),
        ])
    } else {
        Text::from("Select a finding above to see details.")
    };

    let p = Paragraph::new(placeholder_text).alignment(Alignment::Center).block(block);
    frame.render_widget(p, area);
}
