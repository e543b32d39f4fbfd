// src/ui/widgets/footer.rs

use crate::app::{App, Pane};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Renders the footer: a pending notice if there is one, otherwise the keys
/// available in the focused pane.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(notice) = &app.notice {
        let line = Line::from(Span::styled(notice.as_str(), Style::new().bold().fg(Color::Red)));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
        return;
    }

    let key = |k: &'static str| Span::styled(k, Style::new().bold().fg(Color::Yellow));
    let mut spans = match app.pane {
        Pane::Form => vec![key("Enter"), Span::raw(" scan  "), key("↑ ↓"), Span::raw(" field  "), key("F2"), Span::raw(" auth  ")],
        Pane::Findings => vec![key("↑ ↓"), Span::raw(" select finding  "), key("Q"), Span::raw(" quit  ")],
        Pane::History => vec![
            key("↑ ↓"),
            Span::raw(" select  "),
            key("Enter"),
            Span::raw(" open  "),
            key("C"),
            Span::raw(" current report  "),
        ],
    };
    spans.extend([key("Tab"), Span::raw(" next panel  "), key("Esc"), Span::raw(" quit")]);

    let footer = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
