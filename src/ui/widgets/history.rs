// src/ui/widgets/history.rs

use crate::app::{App, Pane};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Renders the scan history, newest first.
pub fn render_history(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.pane == Pane::History { Style::default().fg(Color::Yellow) } else { Style::default() };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!("History ({})", app.history.len()));

    if app.history.is_empty() {
        let empty = Paragraph::new("No scans recorded yet.").alignment(Alignment::Center).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .history
        .iter()
        .map(|entry| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(entry.scan_id.clone().unwrap_or_default(), Style::default().fg(Color::DarkGray)),
                    Span::raw(" "),
                    Span::raw(entry.scan_date.clone()),
                ]),
                Line::from(vec![
                    Span::styled(entry.scan_target.clone(), Style::default().fg(Color::Cyan)),
                    Span::raw(format!(" - {} findings", entry.total_findings)),
                ]),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(list, area, &mut app.history_state);
}
