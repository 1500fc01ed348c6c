use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = super::panel(format!("Fixed Entries ({})", app.recurring.len()));

    if app.recurring.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("No fixed entries", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Add one with :recur <type> <day> <amount> [category] <description>",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["ID", "Day", "Type", "Description", "Category", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .recurring
        .iter()
        .enumerate()
        .skip(app.recurring_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, item)| {
            let amount_style = Style::default().fg(theme::kind_color(item.kind));

            Row::new(vec![
                Cell::from(format!("  {}", item.id)),
                Cell::from(format!("{:>3}", item.day)),
                Cell::from(item.kind.label()),
                Cell::from(truncate(&item.description, 40)),
                Cell::from(item.category.as_str()),
                Cell::from(Span::styled(format_amount(item.amount), amount_style)),
            ])
            .style(theme::row_style(i, app.recurring_index))
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(5),
        Constraint::Length(9),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(16),
    ];

    f.render_widget(Table::new(rows, widths).header(header).block(block), area);
}
