use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.budgets.is_empty() {
        render_empty(f, area);
        return;
    }

    let items: Vec<ListItem> = app
        .budgets
        .iter()
        .enumerate()
        .skip(app.budget_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, status)| {
            let color = theme::tier_color(status.tier);
            let ratio = status.percentage.to_f64().unwrap_or(0.0) / 100.0;

            let style = theme::row_style(i, app.budget_index);

            let mut spans = vec![
                Span::styled(format!("{:<18}", truncate(&status.category, 17)), style),
                Span::styled(
                    format!(
                        "{:>14} / {:<14} ",
                        format_amount(status.spent),
                        format_amount(status.limit)
                    ),
                    Style::default().fg(color),
                ),
                Span::styled(create_progress_bar(ratio, 20), Style::default().fg(color)),
                Span::styled(
                    format!(" {:.0}%", status.percentage),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ];
            if status.is_over() {
                spans.push(Span::styled(
                    format!("  over by {}", format_amount(status.spent - status.limit)),
                    Style::default().fg(theme::RED),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(
        super::panel(format!("Budgets for {}", app.current_month)),
    );
    f.render_widget(list, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No budgets set", theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Use :budget <category> <amount> to set a monthly limit",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(
        super::panel("Budgets"),
    );
    f.render_widget(msg, area);
}

fn create_progress_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
