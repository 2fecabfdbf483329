use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout as TuiLayout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use postwatch::config::{Config, Layout};
use postwatch::render::{self, EntryCard, Trend};
use postwatch::state::{AppState, ProviderCommand, Update, apply_update};
use postwatch::{demo_feed, provider};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(layout: Layout, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(layout),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_refresh(true),
            KeyCode::Char('p') | KeyCode::Char('P') => self.request_refresh(false),
            KeyCode::Char('v') | KeyCode::Char('V') => {
                self.state.layout = self.state.layout.toggled();
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    /// The single trigger for the refresh cycle. While a cycle is in flight
    /// the trigger is a no-op, mirroring a disabled control.
    fn request_refresh(&mut self, force: bool) {
        if self.state.busy {
            self.state.push_log("[INFO] Refresh ignored while busy");
            return;
        }
        if self.cmd_tx.send(ProviderCommand::Refresh { force }).is_err() {
            self.state.push_log("[WARN] Refresh request failed: provider gone");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    if config.demo {
        demo_feed::spawn_demo_provider(tx, cmd_rx);
    } else {
        provider::spawn_provider(config.base_url.clone(), tx, cmd_rx);
    }

    let mut app = App::new(config.layout, cmd_tx);
    // Initial load goes through the cached read, like a first page view.
    app.request_refresh(false);

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Update>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(update) = rx.try_recv() {
            apply_update(&mut app.state, update);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = TuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_entries(frame, chunks[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = format!("POSTWATCH | {}", state.layout.label());
    let status = if state.busy {
        "Loading...".to_string()
    } else if let Some(snapshot) = &state.snapshot {
        render::updated_line(snapshot)
    } else {
        String::new()
    };
    let age = fetched_age(state)
        .map(|secs| format!("fetched {secs}s ago"))
        .unwrap_or_default();
    format!("{title}\n{status}  {age}")
}

fn fetched_age(state: &AppState) -> Option<u64> {
    let at = state.fetched_at?;
    SystemTime::now()
        .duration_since(at)
        .ok()
        .map(|d| d.as_secs())
}

fn footer_text(state: &AppState) -> String {
    let trigger = if state.busy { "r Refreshing..." } else { "r Refresh" };
    format!("{trigger} | p Reload | j/k/↑/↓ Scroll | v Layout | ? Help | q Quit")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No activity yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_entries(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.busy {
        let loading = Paragraph::new("Fetching post counts...")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, area);
        return;
    }

    if let Some(message) = &state.error {
        let error = Paragraph::new(format!("Error: {message}"))
            .style(Style::default().fg(Color::Red));
        frame.render_widget(error, area);
        return;
    }

    let Some(snapshot) = &state.snapshot else {
        let empty = Paragraph::new("No data yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let cards = render::build_cards(snapshot);
    if cards.is_empty() {
        let empty = Paragraph::new("No sites in this snapshot")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    match state.layout {
        Layout::Cards => render_card_stack(frame, area, &cards, state.scroll),
        Layout::List => render_list_rows(frame, area, &cards, state.scroll),
    }
}

fn render_card_stack(frame: &mut Frame, area: Rect, cards: &[EntryCard], scroll: usize) {
    let start = scroll.min(cards.len().saturating_sub(1));
    let mut y = area.y;

    for card in &cards[start..] {
        let lines = card_lines(card);
        let height = lines.len() as u16 + 2;
        if y + height > area.y + area.height {
            break;
        }
        let card_area = Rect {
            x: area.x,
            y,
            width: area.width,
            height,
        };
        let block = Block::default()
            .title(card.title.clone())
            .borders(Borders::ALL);
        let body = Paragraph::new(lines).block(block);
        frame.render_widget(body, card_area);
        y += height;
    }
}

fn card_lines(card: &EntryCard) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        card.count_text.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(link) = &card.link {
        lines.push(Line::from(Span::styled(
            link.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(gender) = &card.gender_line {
        lines.push(Line::from(gender.clone()));
    }
    if let Some(ratio) = &card.ratio_line {
        lines.push(Line::from(ratio.clone()));
    }
    for row in &card.comparison_rows {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", row.label),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(row.value.clone(), trend_style(row.trend)),
        ]));
    }
    lines
}

fn render_list_rows(frame: &mut Frame, area: Rect, cards: &[EntryCard], scroll: usize) {
    let visible = area.height as usize;
    let start = scroll.min(cards.len().saturating_sub(1));
    let end = (start + visible).min(cards.len());

    for (i, card) in cards[start..end].iter().enumerate() {
        let row_area = Rect {
            x: area.x,
            y: area.y + i as u16,
            width: area.width,
            height: 1,
        };
        frame.render_widget(Paragraph::new(list_line(card)), row_area);
    }
}

fn list_line(card: &EntryCard) -> Line<'_> {
    let mut spans = vec![
        Span::styled(
            format!("{:<20}", card.title),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{:<12}", card.count_text)),
    ];
    if let Some(gender) = &card.gender_line {
        spans.push(Span::raw(format!("{gender}  ")));
    }
    if let Some(ratio) = &card.ratio_line {
        spans.push(Span::styled(
            format!("{ratio}  "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    for row in &card.comparison_rows {
        spans.push(Span::styled(
            format!("{}: ", row.label),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            format!("{}  ", row.value),
            trend_style(row.trend),
        ));
    }
    Line::from(spans)
}

fn trend_style(trend: Trend) -> Style {
    match trend {
        Trend::Up => Style::default().fg(Color::Green),
        Trend::Down => Style::default().fg(Color::Red),
        Trend::Flat => Style::default().fg(Color::DarkGray),
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "postwatch - Help",
        "",
        "  r            Force refresh (upstream recount)",
        "  p            Reload cached counts",
        "  j/k or ↑/↓   Scroll entries",
        "  v            Toggle cards/list layout",
        "  ?            Toggle help",
        "  Esc          Close help",
        "  q            Quit",
        "",
        "Comparison colors: green up, red down, gray flat.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = TuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = TuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
