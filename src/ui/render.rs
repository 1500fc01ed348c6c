use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme;
use super::util::format_amount;

/// Key bindings listed in the help overlay, two per row.
const KEY_HELP: &[(&str, &str)] = &[
    ("j/k, Up/Down", "Move cursor"),
    ("1-4", "Switch screen"),
    ("Tab/Shift-Tab", "Cycle screens"),
    ("g/G", "Top/Bottom"),
    ("H/L", "Prev/Next month"),
    ("Ctrl-d/u", "Half page down/up"),
    (":", "Command mode"),
    ("/", "Live search"),
    ("e", "Edit transaction"),
    ("D", "Delete selected"),
    ("y / n", "Answer prompt"),
    ("Esc", "Clear search/Back"),
    ("?", "Toggle help"),
    ("Ctrl-q", "Quit"),
];

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    match app.screen {
        Screen::Dashboard => super::screens::dashboard::render(f, chunks[1], app),
        Screen::Transactions => super::screens::transactions::render(f, chunks[1], app),
        Screen::Budgets => super::screens::budgets::render(f, chunks[1], app),
        Screen::Recurring => super::screens::recurring::render(f, chunks[1], app),
    }
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let label_style = if *s == app.screen {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::dim_style()
            };
            Line::from(vec![
                Span::styled(format!("{}:", i + 1), theme::dim_style()),
                Span::styled(s.to_string(), label_style),
            ])
        })
        .collect();

    let balance = app.summary.balance;
    let month_label = format!(" {}  {} ", app.current_month, format_amount(balance));
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(month_label.chars().count() as u16),
        ])
        .split(area);

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));
    f.render_widget(tabs, columns[0]);

    let balance_color = if balance.is_sign_negative() {
        theme::RED
    } else {
        theme::GREEN
    };
    let month = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", app.current_month),
            Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", format_amount(balance)),
            Style::default().fg(balance_color),
        ),
    ]))
    .style(Style::default().bg(theme::HEADER_BG));
    f.render_widget(month, columns[1]);
}

fn mode_color(mode: InputMode) -> Color {
    match mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command => theme::GREEN,
        InputMode::Search => theme::YELLOW,
        InputMode::Confirm => theme::RED,
    }
}

fn screen_hints(screen: Screen) -> &'static str {
    match screen {
        Screen::Dashboard => " H/L month | :apply fixed | ? help ",
        Screen::Transactions => " e edit | D delete | /search | ? help ",
        Screen::Budgets => " :budget <category> <amount> | ? help ",
        Screen::Recurring => " D delete | :recur | :apply | ? help ",
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_style = Style::default()
        .fg(theme::HEADER_BG)
        .bg(mode_color(app.input_mode))
        .add_modifier(Modifier::BOLD);

    let mut info = format!(" {} | {} txns", app.screen, app.month_transaction_count);
    if !app.recurring.is_empty() {
        info.push_str(&format!(" | {} fixed", app.recurring.len()));
    }
    let hints = screen_hints(app.screen);

    let used = mode_label.len() + info.len() + hints.len();
    let pad = (area.width as usize).saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(mode_label, mode_style),
        Span::styled(info, theme::status_bar_style()),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(hints, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let prompt = |sigil: &'static str, color: Color, text: &str| {
        Line::from(vec![
            Span::styled(sigil, Style::default().fg(color)),
            Span::styled(text.to_string(), theme::command_bar_style()),
        ])
    };

    let (mut content, cursor) = match app.input_mode {
        InputMode::Command => (
            prompt(":", theme::ACCENT, &app.command_input),
            Some(1 + app.command_input.chars().count()),
        ),
        InputMode::Search => (
            prompt("/", theme::YELLOW, &app.search_input),
            Some(1 + app.search_input.chars().count()),
        ),
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(app.confirm_message.as_str(), Style::default().fg(theme::YELLOW)),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ]),
            None,
        ),
        InputMode::Normal if app.status_message.is_empty() => (
            Line::from(Span::styled(
                " Press : for commands, / to search, ? for help",
                theme::dim_style(),
            )),
            None,
        ),
        InputMode::Normal => (
            Line::from(Span::styled(
                app.status_message.as_str(),
                theme::command_bar_style(),
            )),
            None,
        ),
    };

    if app.input_mode == InputMode::Search && !app.search_input.is_empty() {
        content.push_span(Span::styled(
            format!("  ({} of {})", app.transactions.len(), app.month_transaction_count),
            theme::dim_style(),
        ));
    }

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor {
        f.set_cursor_position((area.x + offset as u16, area.y));
    }
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let mut help_text = vec![
        Line::from(Span::styled(
            " fintrack Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(" Keys", theme::section_style())),
    ];

    for pair in KEY_HELP.chunks(2) {
        let cells: String = pair
            .iter()
            .map(|(key, what)| format!("  {key:<14} {what:<20}"))
            .collect();
        help_text.push(Line::from(Span::styled(cells, theme::normal_style())));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(" Commands", theme::section_style())));

    // Short aliases are left out
    let mut cmd_lines: Vec<(&str, &str)> = commands::COMMANDS
        .iter()
        .filter(|(name, _)| name.len() > 2)
        .map(|(name, cmd)| (*name, cmd.description))
        .collect();
    cmd_lines.sort_by_key(|(name, _)| *name);
    for (name, desc) in &cmd_lines {
        help_text.push(Line::from(Span::styled(
            format!("  :{name:<14} {desc}"),
            theme::normal_style(),
        )));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        " Press any key to close ",
        theme::dim_style(),
    )));

    // Center the popup, clamped to terminal height
    let popup_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 80.min(area.width.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup_area);
}
