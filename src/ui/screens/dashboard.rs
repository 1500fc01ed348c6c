use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let reminder_height = if app.recurring.is_empty() { 0 } else { 1 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),               // Summary cards
            Constraint::Length(reminder_height), // Fixed entries reminder
            Constraint::Min(10),                 // Spending chart
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);
    if reminder_height > 0 {
        render_reminder(f, chunks[1], app);
    }
    render_spending_chart(f, chunks[2], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let balance = app.summary.balance;

    render_card(
        f,
        cards[0],
        "Income",
        app.summary.income,
        theme::GREEN,
        None,
    );
    render_card(
        f,
        cards[1],
        "Expenses",
        app.summary.expense,
        theme::RED,
        None,
    );
    render_card(
        f,
        cards[2],
        "Balance",
        balance,
        if balance >= Decimal::ZERO {
            theme::GREEN
        } else {
            theme::RED
        },
        Some(format!("{} txns", app.month_transaction_count)),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    amount: Decimal,
    color: ratatui::style::Color,
    subtitle: Option<String>,
) {
    let block = super::panel(title);

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format_amount(amount),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle.unwrap_or_default(), theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_reminder(f: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} fixed entries on file. ", app.recurring.len()),
            Style::default().fg(theme::YELLOW).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("Post them into {} with :apply", app.current_month),
            theme::dim_style(),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_spending_chart(f: &mut Frame, area: Rect, app: &App) {
    let block = super::panel("Spending by Category");

    if app.spending_by_category.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No expenses this month. Add one with :add",
            theme::dim_style(),
        )))
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = app
        .spending_by_category
        .iter()
        .map(|(name, amt)| {
            // Budgeted categories take their tier colour
            let color = app
                .budgets
                .iter()
                .find(|b| &b.category == name)
                .map_or(theme::ACCENT, |b| theme::tier_color(b.tier));
            Bar::default()
                .value(amt.to_u64().unwrap_or(0))
                .label(Line::from(truncate(name, 12)))
                .text_value(format_amount(*amt))
                .style(Style::default().fg(color))
                .value_style(
                    Style::default()
                        .fg(theme::TEXT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::ACCENT))
        .value_style(Style::default().fg(theme::TEXT));

    f.render_widget(chart, area);
}
