use ratatui::{
    style::Style,
    text::Span,
    widgets::{Block, Borders},
};

use super::theme;

pub(crate) mod budgets;
pub(crate) mod dashboard;
pub(crate) mod recurring;
pub(crate) mod transactions;

/// Bordered panel with a dim bold title, shared by every screen.
fn panel<'a>(title: impl Into<String>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {} ", title.into()),
            theme::title_style(),
        ))
}
