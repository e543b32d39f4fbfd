// src/ui/widgets/input.rs

use crate::app::{App, AuthMethod, FormField, Pane};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use strum::IntoEnumIterator;

const LABEL_WIDTH: usize = 13;

/// Renders the target form, one field per line.
pub fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.pane == Pane::Form;
    let border_style = if editing { Style::default().fg(Color::Yellow) } else { Style::default() };
    let form_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!("Target (auth: {}, F2 to switch)", app.form.auth));

    let lines: Vec<Line> = FormField::iter()
        .map(|field| {
            let label = match field {
                FormField::Secret => app.form.auth.to_string(),
                other => other.to_string(),
            };
            let value = display_value(app, field);
            let value_style = if editing && field == app.form.focus {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:<width$}", format!("{}:", label), width = LABEL_WIDTH), Style::default().fg(Color::DarkGray)),
                Span::styled(value, value_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(form_block), area);

    // Cursor only while the form has focus.
    if editing {
        let row = FormField::iter().position(|f| f == app.form.focus).unwrap_or(0) as u16;
        let column = (LABEL_WIDTH + display_value(app, app.form.focus).chars().count()) as u16;
        frame.set_cursor_position(Position::new(area.x + 1 + column, area.y + 1 + row));
    }
}

fn display_value(app: &App, field: FormField) -> String {
    let value = app.form.value(field);
    if field == FormField::Secret && app.form.auth == AuthMethod::Password {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    }
}
