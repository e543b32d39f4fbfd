// src/ui/layout.rs

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions, computed once per frame.
pub struct AppLayout {
    pub form: Rect,
    pub report: Rect,
    pub summary: Rect,
    pub history: Rect,
    pub footer: Rect,
}

/// Splits the frame into the target form on top, the content row in the
/// middle (report, summary, history side by side) and a one-line footer.
pub fn create_layout(frame_size: Rect) -> AppLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame_size);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(52),
            Constraint::Percentage(20),
            Constraint::Percentage(28),
        ])
        .split(main_chunks[1]);

    AppLayout {
        form: main_chunks[0],
        report: content_chunks[0],
        summary: content_chunks[1],
        history: content_chunks[2],
        footer: main_chunks[2],
    }
}
