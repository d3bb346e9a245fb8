//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout: task header, the form itself, and a bottom
/// status/hint bar.
pub struct AppLayout {
    pub header_area: Rect,
    pub form_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // task title + progress
                Constraint::Min(3),    // form (takes all remaining space)
                Constraint::Length(1), // status / hint bar
            ])
            .split(area);

        Self {
            header_area: chunks[0],
            form_area: chunks[1],
            status_area: chunks[2],
        }
    }
}
