use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::{error, info, warn};

use wc_predictor::config::{app_cache_dir, config};
use wc_predictor::export::export_standings_xlsx;
use wc_predictor::import::load_matches_file;
use wc_predictor::logging::init_file_logging;
use wc_predictor::model::{Group, Outcome};
use wc_predictor::prediction::{PredictionResult, changes_allowed, prediction_result};
use wc_predictor::repository::{
    InMemoryRepository, MatchRepository, PredictionRepository, SqliteRepository,
};
use wc_predictor::state::{AppState, Screen};

struct App<R> {
    state: AppState,
    repo: R,
    should_quit: bool,
}

impl<R> App<R>
where
    R: MatchRepository + PredictionRepository,
{
    fn new(repo: R, user_id: u32) -> Self {
        let mut state = AppState::new(user_id);
        if let Err(err) = state.refresh(&repo) {
            state.push_log(format!("[WARN] Load failed: {err}"));
        }
        Self {
            state,
            repo,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Groups,
            KeyCode::Char('2') => self.state.screen = Screen::Matches,
            KeyCode::Tab => {
                self.state.screen = match self.state.screen {
                    Screen::Groups => Screen::Matches,
                    Screen::Matches => Screen::Groups,
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('h') => self.predict(Outcome::Home),
            KeyCode::Char('d') => self.predict(Outcome::Draw),
            KeyCode::Char('a') => self.predict(Outcome::Away),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn predict(&mut self, outcome: Outcome) {
        if self.state.screen != Screen::Matches {
            self.state.push_log("[INFO] Open the match list (2) to predict");
            return;
        }
        self.state.predict_selected(&mut self.repo, outcome, Utc::now());
    }

    fn reload(&mut self) {
        match self.state.refresh(&self.repo) {
            Ok(()) => self.state.push_log("[INFO] Standings reloaded"),
            Err(err) => self.state.push_log(format!("[WARN] Reload failed: {err}")),
        }
    }

    fn export(&mut self) {
        let Some(path) = app_cache_dir().map(|dir| dir.join("standings.xlsx")) else {
            self.state.push_log("[WARN] No cache dir for export");
            return;
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        match export_standings_xlsx(&path, &self.state.groups, Some(&self.state.user)) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} teams to {}",
                report.teams,
                path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err}")),
        }
    }
}

fn main() -> Result<()> {
    let cfg = config();
    if let Some(dir) = app_cache_dir() {
        init_file_logging(&dir.join("wc_predictor.log"), &cfg.log)?;
    }

    match cfg.db_path.as_deref().map(SqliteRepository::open) {
        Some(Ok(mut repo)) => {
            import_startup_matches(&mut repo);
            run(repo, cfg.user_id)
        }
        Some(Err(err)) => {
            warn!(%err, "sqlite unavailable, using in-memory store");
            let mut repo = InMemoryRepository::new();
            import_startup_matches(&mut repo);
            run(repo, cfg.user_id)
        }
        None => {
            let mut repo = InMemoryRepository::new();
            import_startup_matches(&mut repo);
            run(repo, cfg.user_id)
        }
    }
}

fn import_startup_matches<R: MatchRepository>(repo: &mut R) {
    let Some(path) = config().matches_file.as_deref() else {
        return;
    };
    let matches = match load_matches_file(path) {
        Ok(matches) => matches,
        Err(err) => {
            error!(path = %path.display(), %err, "fixture import failed");
            return;
        }
    };
    for m in &matches {
        if let Err(err) = repo.upsert_match(m) {
            error!(match_id = m.id, %err, "match upsert failed");
            return;
        }
    }
    info!(count = matches.len(), "startup fixtures imported");
}

fn run<R>(repo: R, user_id: u32) -> Result<()>
where
    R: MatchRepository + PredictionRepository,
{
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(repo, user_id);
    let res = run_app(&mut terminal, &mut app);

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

fn run_app<B, R>(terminal: &mut Terminal<B>, app: &mut App<R>) -> io::Result<()>
where
    B: Backend,
    R: MatchRepository + PredictionRepository,
{
    // Redraw at least this often so kickoff locks show up without a key press.
    let redraw_every = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui(f, &app.state))?;

        if event::poll(redraw_every)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.screen {
        Screen::Groups => render_groups(frame, chunks[1], state),
        Screen::Matches => render_matches(frame, chunks[1], state),
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::TOP))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let tally = state.tally();
    let screen = match state.screen {
        Screen::Groups => "GROUPS",
        Screen::Matches => "MATCHES",
    };
    format!(
        " WC PREDICTOR | {screen} | user {} | guessed {} missed {} pending {}",
        state.user_id, tally.guessed, tally.missed, tally.pending
    )
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Groups => {
            "1 Groups | 2 Matches | j/k Scroll | r Reload | e Export | ? Help | q Quit".to_string()
        }
        Screen::Matches => {
            "1 Groups | j/k Move | h Home | d Draw | a Away | r Reload | e Export | ? Help | q Quit"
                .to_string()
        }
    }
}

fn render_groups(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.groups.is_empty() {
        let empty = Paragraph::new("No matches loaded (set WC_MATCHES_FILE)")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }
    let text = state
        .groups
        .iter()
        .map(group_table_text)
        .collect::<Vec<_>>()
        .join("\n\n");
    let paragraph = Paragraph::new(text).scroll((state.group_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn group_table_text(group: &Group) -> String {
    let mut lines = vec![
        group.name.clone(),
        format!(
            "  {:>2}  {:<22} {:>2} {:>2} {:>2} {:>2} {:>3} {:>3} {:>4} {:>4}",
            "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
        ),
    ];
    for (idx, team) in group.teams.iter().enumerate() {
        lines.push(format!(
            "  {:>2}  {:<22} {:>2} {:>2} {:>2} {:>2} {:>3} {:>3} {:>+4} {:>4}",
            idx + 1,
            truncate(&team.name, 22),
            team.matches_played,
            team.wins,
            team.draws,
            team.losses,
            team.goals_scored,
            team.goals_against,
            team.goal_difference,
            team.points
        ));
    }
    lines.join("\n")
}

fn render_matches(frame: &mut Frame, area: Rect, state: &AppState) {
    let matches = &state.user.matches;
    if matches.is_empty() {
        let empty =
            Paragraph::new("No matches to predict").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }
    if area.height == 0 {
        return;
    }

    let now = Utc::now();
    let visible = area.height as usize;
    let (start, end) = visible_range(state.selected, matches.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: area.x,
            y: area.y + i as u16,
            width: area.width,
            height: 1,
        };
        let m = &matches[idx];
        let locked = !changes_allowed(&m.fixture, now);
        let row_style = if idx == state.selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else if locked {
            Style::default().fg(Color::Gray)
        } else {
            Style::default()
        };

        let date = m
            .fixture
            .date
            .map(|d| d.format("%b %d %H:%M").to_string())
            .unwrap_or_else(|| "TBD".to_string());
        let score = m
            .fixture
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "vs".to_string());
        let prediction = m.prediction.map(|p| p.as_str()).unwrap_or("--");
        let marker = match prediction_result(m) {
            PredictionResult::Guessed => "✓",
            PredictionResult::Missed => "✗",
            PredictionResult::Pending => " ",
        };
        let line = format!(
            "{:<12} {:>20} {:^5} {:<20} {:<14} {:<5} {}",
            date,
            truncate(&m.fixture.home, 20),
            score,
            truncate(&m.fixture.away, 20),
            truncate(&m.fixture.stage, 14),
            prediction,
            marker
        );
        frame.render_widget(Paragraph::new(line).style(row_style), row_area);
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
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

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out = text.chars().take(max.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "WC Predictor - Help",
        "",
        "Global:",
        "  1 / 2 / Tab  Groups / Matches",
        "  r            Reload from store",
        "  e            Export standings to xlsx",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Matches:",
        "  j/k or ↑/↓   Move",
        "  h / d / a    Predict home / draw / away",
        "",
        "Predictions lock at kickoff.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
