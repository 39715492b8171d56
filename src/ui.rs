use anyhow::Result;
use budget_tracker::{
    AlertLevel, CalendarMonth, MonthCursor, SpendTier, SqliteStore, Theme, Tracker, Transaction,
};
use chrono::{Datelike, Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

/// Rows shown in the dashboard's recent list (the ledger page shows all).
const RECENT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Ledger,
    Calendar,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Dashboard => Page::Ledger,
            Page::Ledger => Page::Calendar,
            Page::Calendar => Page::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Dashboard => Page::Calendar,
            Page::Ledger => Page::Dashboard,
            Page::Calendar => Page::Ledger,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Ledger => "Transactions",
            Page::Calendar => "Calendar",
        }
    }
}

pub struct App {
    pub tracker: Tracker<SqliteStore>,
    pub current_page: Page,
    /// Selection in the ledger table; rows are newest first.
    pub state: TableState,
    pub cursor: MonthCursor,
    pub selected_day: u32,
    /// Id waiting for a second `x` to confirm deletion.
    pub pending_delete: Option<i64>,
    pub message: Option<String>,
}

impl App {
    pub fn new(tracker: Tracker<SqliteStore>) -> Self {
        let today = Local::now().date_naive();

        let mut state = TableState::default();
        if !tracker.transactions().is_empty() {
            state.select(Some(0));
        }

        Self {
            tracker,
            current_page: Page::Dashboard,
            state,
            cursor: MonthCursor::of(today),
            selected_day: today.day(),
            pending_delete: None,
            message: None,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// Ledger rows, newest first.
    pub fn rows(&self) -> Vec<&Transaction> {
        self.tracker.transactions().iter().rev().collect()
    }

    pub fn selected_transaction(&self) -> Option<&Transaction> {
        self.state.selected().and_then(|i| self.rows().get(i).copied())
    }

    pub fn next(&mut self) {
        let len = self.tracker.transactions().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.tracker.transactions().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// First press arms, second press on the same row deletes.
    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_transaction().map(|tx| tx.id) else {
            return;
        };

        if self.pending_delete != Some(id) {
            self.pending_delete = Some(id);
            self.message = Some("Press x again to delete this transaction".to_string());
            return;
        }

        self.pending_delete = None;
        self.message = Some(match self.tracker.remove_transaction(id) {
            Ok(Some(_)) => "Transaction deleted".to_string(),
            Ok(None) => "Transaction was already gone".to_string(),
            Err(e) => format!("Delete failed: {}", e),
        });

        let len = self.tracker.transactions().len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn toggle_theme(&mut self) {
        self.message = Some(match self.tracker.toggle_theme() {
            Ok(theme) => format!("Theme: {}", theme.as_str()),
            Err(e) => format!("Theme not saved: {}", e),
        });
    }

    pub fn month(&self) -> CalendarMonth {
        self.tracker.calendar_month(self.cursor)
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.cursor.year, self.cursor.month, self.selected_day)
    }

    pub fn next_month(&mut self) {
        self.cursor = self.cursor.next();
        self.clamp_day();
    }

    pub fn previous_month(&mut self) {
        self.cursor = self.cursor.previous();
        self.clamp_day();
    }

    /// Move the day selection, crossing into neighbouring months.
    pub fn move_day(&mut self, delta: i64) {
        let Some(date) = self.selected_date() else {
            return;
        };
        if let Some(moved) = date.checked_add_signed(chrono::Duration::days(delta)) {
            self.cursor = MonthCursor::of(moved);
            self.selected_day = moved.day();
        }
    }

    fn clamp_day(&mut self) {
        self.selected_day = self.selected_day.clamp(1, self.cursor.days_in_month().max(1));
    }

    fn palette(&self) -> Palette {
        Palette::for_theme(self.tracker.settings().theme)
    }

    fn money(&self, amount: f64) -> String {
        self.tracker.settings().format_amount(amount)
    }
}

#[derive(Clone, Copy)]
struct Palette {
    text: Color,
    muted: Color,
    accent: Color,
    border: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Yellow,
                border: Color::Cyan,
            },
            Theme::Light => Palette {
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                border: Color::Blue,
            },
        }
    }
}

fn tier_color(tier: SpendTier) -> Color {
    match tier {
        SpendTier::None => Color::Reset,
        SpendTier::Low => Color::Green,
        SpendTier::Medium => Color::Yellow,
        SpendTier::High => Color::Red,
    }
}

fn alert_color(level: AlertLevel) -> Color {
    match level {
        AlertLevel::OnTrack => Color::Green,
        AlertLevel::NearLimit => Color::Yellow,
        AlertLevel::Exceeded => Color::Red,
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if !matches!(key.code, KeyCode::Char('x')) {
            app.pending_delete = None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    app.previous_page();
                } else {
                    app.next_page();
                }
            }
            KeyCode::BackTab => app.previous_page(),
            KeyCode::Char('t') => app.toggle_theme(),
            _ => match app.current_page {
                Page::Dashboard => {}
                Page::Ledger => match key.code {
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Char('x') | KeyCode::Delete => app.delete_selected(),
                    _ => {}
                },
                Page::Calendar => match key.code {
                    KeyCode::Left | KeyCode::Char('h') => app.move_day(-1),
                    KeyCode::Right | KeyCode::Char('l') => app.move_day(1),
                    KeyCode::Up | KeyCode::Char('k') => app.move_day(-7),
                    KeyCode::Down | KeyCode::Char('j') => app.move_day(7),
                    KeyCode::Char('[') | KeyCode::PageUp => app.previous_month(),
                    KeyCode::Char(']') | KeyCode::PageDown => app.next_month(),
                    _ => {}
                },
            },
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Dashboard => render_dashboard(f, chunks[1], app),
        Page::Ledger => render_ledger(f, chunks[1], app),
        Page::Calendar => render_calendar(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let totals = app.tracker.totals();

    let mut tab_spans = vec![];
    for (i, page) in [Page::Dashboard, Page::Ledger, Page::Calendar].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(palette.muted)
        };
        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Balance: {}", app.money(totals.balance)),
        Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("↑ {}", app.money(totals.income)),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("↓ {}", app.money(totals.expense)),
        Style::default().fg(Color::Red),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );

    f.render_widget(header, area);
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(RECENT_LIMIT as u16 + 2)])
        .split(columns[0]);

    render_alerts(f, left[0], app);
    render_recent(f, left[1], app);
    render_spending_chart(f, columns[1], app);
}

fn render_alerts(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let alerts = app.tracker.current_alerts();
    let month_name = Local::now().format("%B").to_string();

    let lines: Vec<Line> = if alerts.is_empty() {
        vec![Line::from(Span::styled(
            "Set budgets to get smart alerts",
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        ))]
    } else {
        alerts
            .iter()
            .map(|alert| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<14}", truncate(&alert.usage.category, 14)),
                        Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{:<16}", alert.level.label()),
                        Style::default().fg(alert_color(alert.level)),
                    ),
                    Span::styled(
                        format!(
                            "{}: {} / {}",
                            month_name,
                            app.money(alert.usage.spent),
                            app.money(alert.usage.limit)
                        ),
                        Style::default().fg(palette.muted),
                    ),
                ])
            })
            .collect()
    };

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Budget Alerts "),
    );
    f.render_widget(panel, area);
}

fn render_recent(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();

    let lines: Vec<Line> = app
        .tracker
        .recent(RECENT_LIMIT)
        .into_iter()
        .map(|tx| {
            let (sign, color) = if tx.is_income() { ("+", Color::Green) } else { ("-", Color::Red) };
            Line::from(vec![
                Span::styled(
                    format!("{:<22}", truncate(&tx.description, 22)),
                    Style::default().fg(palette.text),
                ),
                Span::styled(
                    format!("{:<14}", truncate(&tx.category, 14)),
                    Style::default().fg(palette.muted),
                ),
                Span::styled(format!("{}{}", sign, app.money(tx.amount)), Style::default().fg(color)),
            ])
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Recent "),
    );
    f.render_widget(panel, area);
}

fn render_spending_chart(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let by_category = app.tracker.expense_by_category();
    let max = by_category.values().cloned().fold(0.0_f64, f64::max);
    let bar_space = area.width.saturating_sub(34) as f64;

    let lines: Vec<Line> = if by_category.is_empty() {
        vec![Line::from(Span::styled(
            "No expenses yet",
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        ))]
    } else {
        by_category
            .iter()
            .map(|(category, total)| {
                let width = if max > 0.0 { ((total / max) * bar_space).round() as usize } else { 0 };
                Line::from(vec![
                    Span::styled(format!("{:<14}", truncate(category, 14)), Style::default().fg(palette.text)),
                    Span::styled("█".repeat(width), Style::default().fg(palette.accent)),
                    Span::styled(format!(" {}", app.money(*total)), Style::default().fg(palette.muted)),
                ])
            })
            .collect()
    };

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Spending by Category "),
    );
    f.render_widget(panel, area);
}

fn render_ledger(f: &mut Frame, area: Rect, app: &mut App) {
    let palette = app.palette();

    let header_cells = ["Date", "Description", "Category", "Type", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .rows()
        .into_iter()
        .map(|tx| {
            let color = if tx.is_income() { Color::Green } else { Color::Red };
            Row::new(vec![
                Cell::from(tx.local_date().format("%d %b %Y").to_string()),
                Cell::from(truncate(&tx.description, 30)),
                Cell::from(truncate(&tx.category, 18)),
                Cell::from(tx.kind.as_str()).style(Style::default().fg(color)),
                Cell::from(app.money(tx.amount)).style(Style::default().fg(color)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(13),
            Constraint::Length(32),
            Constraint::Length(20),
            Constraint::Length(9),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Transactions "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_calendar(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let month = app.month();
    let limits = app.tracker.calendar_limits();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(62), Constraint::Min(20)])
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("  {}", month.cursor.title()),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "   Mon     Tue     Wed     Thu     Fri     Sat     Sun",
            Style::default().fg(palette.muted),
        )),
    ];

    for week in month.weeks() {
        let mut day_spans = vec![Span::raw(" ")];
        let mut amount_spans = vec![Span::raw(" ")];
        for cell in week {
            match cell {
                Some(day) => {
                    let mut style = Style::default().fg(tier_color(day.tier));
                    if day.tier == SpendTier::None {
                        style = style.fg(palette.text);
                    }
                    if day.day == app.selected_day {
                        style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                    }
                    day_spans.push(Span::styled(format!("{:>4}    ", day.day), style));
                    let amount = if day.total > 0.0 { compact(day.total) } else { String::new() };
                    amount_spans.push(Span::styled(
                        format!("{:>7} ", amount),
                        Style::default().fg(tier_color(day.tier)),
                    ));
                }
                None => {
                    day_spans.push(Span::raw("        "));
                    amount_spans.push(Span::raw("        "));
                }
            }
        }
        lines.push(Line::from(day_spans));
        lines.push(Line::from(amount_spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  ■ ", Style::default().fg(Color::Green)),
        Span::raw(format!("≤ {}  ", app.money(limits.low))),
        Span::styled("■ ", Style::default().fg(Color::Yellow)),
        Span::raw(format!("≤ {}  ", app.money(limits.medium))),
        Span::styled("■ ", Style::default().fg(Color::Red)),
        Span::raw(format!("> {}", app.money(limits.medium))),
    ]));

    let grid = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Calendar "),
    );
    f.render_widget(grid, columns[0]);

    render_day_details(f, columns[1], app);
}

fn render_day_details(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" Day Details ");

    let Some(date) = app.selected_date() else {
        f.render_widget(Paragraph::new("No day selected").block(block), area);
        return;
    };
    let details = app.tracker.day_details(date);

    let mut lines = vec![
        Line::from(Span::styled(
            date.format("%a %b %d %Y").to_string(),
            Style::default().fg(palette.muted),
        )),
        Line::from(""),
    ];

    if details.expenses.is_empty() {
        lines.push(Line::from(Span::styled(
            "No expenses recorded",
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Total: ", Style::default().fg(palette.text).add_modifier(Modifier::BOLD)),
            Span::styled(app.money(details.total), Style::default().fg(tier_color(app.tracker.calendar_limits().tier(details.total)))),
        ]));
        lines.push(Line::from(""));
        for tx in &details.expenses {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<24}", truncate(&tx.description, 24)), Style::default().fg(palette.text)),
                Span::styled(app.money(tx.amount), Style::default().fg(Color::Red)),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let key = |k: &str| Span::styled(k.to_string(), Style::default().fg(palette.accent));

    let mut status_spans = vec![];
    if let Some(message) = &app.message {
        status_spans.push(Span::styled(format!(" {} ", message), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw("| "));
    }

    status_spans.push(key("Tab"));
    status_spans.push(Span::raw(" Page | "));
    match app.current_page {
        Page::Dashboard => {}
        Page::Ledger => {
            status_spans.push(key("↑/↓"));
            status_spans.push(Span::raw(" Nav | "));
            status_spans.push(key("x"));
            status_spans.push(Span::raw(" Delete | "));
        }
        Page::Calendar => {
            status_spans.push(key("←/→/↑/↓"));
            status_spans.push(Span::raw(" Day | "));
            status_spans.push(key("[ ]"));
            status_spans.push(Span::raw(" Month | "));
        }
    }
    status_spans.push(key("t"));
    status_spans.push(Span::raw(" Theme | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Fit an amount into a calendar cell: 950, 1.2k, 15k.
fn compact(amount: f64) -> String {
    if amount >= 10_000.0 {
        format!("{:.0}k", amount / 1000.0)
    } else if amount >= 1000.0 {
        format!("{:.1}k", amount / 1000.0)
    } else {
        format!("{:.0}", amount)
    }
}
