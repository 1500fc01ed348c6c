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
    if app.transactions.is_empty() {
        let msg = if !app.search_input.is_empty() {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("No transactions matching '{}'", app.search_input),
                    theme::dim_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press Esc to clear the search",
                    theme::dim_style(),
                )),
            ]
        } else {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("No transactions in {}", app.current_month),
                    theme::dim_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Add one with :add <type> <category> <amount> <date> <description>",
                    theme::dim_style(),
                )),
            ]
        };
        let block = super::panel("Transactions (0)");
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["Date", "Type", "Description", "Category", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .transactions
        .iter()
        .enumerate()
        .skip(app.transaction_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, txn)| {
            let sign = if txn.is_income() { "+" } else { "-" };
            let amount_style = Style::default().fg(theme::kind_color(txn.kind));

            Row::new(vec![
                Cell::from(format!("  {}", txn.date.format("%d/%m/%Y"))),
                Cell::from(txn.kind.label()),
                Cell::from(truncate(&txn.description, 40)),
                Cell::from(txn.category.as_str()),
                Cell::from(Span::styled(
                    format!("{sign}{}", format_amount(txn.amount)),
                    amount_style,
                )),
            ])
            .style(theme::row_style(i, app.transaction_index))
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(16),
    ];

    let filtered = if app.search_input.is_empty() {
        String::new()
    } else {
        format!(
            "of {} search: '{}'",
            app.month_transaction_count, app.search_input
        )
    };

    let title = format!(
        "Transactions {} ({}) {filtered}",
        app.current_month,
        app.transactions.len()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(super::panel(title.trim_end()));

    f.render_widget(table, area);
}
