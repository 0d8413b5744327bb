use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph};

use mma_terminal::charts::{chart_label, ScatterData};
use mma_terminal::dataset::SourceConfig;
use mma_terminal::state::{AppState, Screen};
use mma_terminal::view::{DashboardData, FighterView, StatLine};

struct App {
    data: DashboardData,
    state: AppState,
    view: Option<FighterView>,
    should_quit: bool,
}

impl App {
    fn new(data: DashboardData) -> Self {
        let roster = data.roster();
        let mut state = AppState::new(roster);
        state.push_log(format!(
            "[INFO] Loaded {} fighters, {} fight rows",
            data.dataset.fighters.len(),
            data.dataset.fights.len()
        ));
        if data.dataset.skipped_rows > 0 {
            state.push_log(format!(
                "[WARN] Skipped {} malformed source rows",
                data.dataset.skipped_rows
            ));
        }
        let unresolved = data.dataset.unresolved_id_count();
        if unresolved > 0 {
            state.push_log(format!(
                "[WARN] {unresolved} fight rows reference unknown fighter ids"
            ));
        }
        Self {
            data,
            state,
            view: None,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') if self.state.screen == Screen::Roster => {
                self.state.search_active = true;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if matches!(self.state.screen, Screen::Fighter { .. }) {
                    let max_scroll = self.log_max_scroll();
                    self.state.scroll_log_down(max_scroll);
                } else {
                    self.state.select_next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if matches!(self.state.screen, Screen::Fighter { .. }) {
                    self.state.scroll_log_up();
                } else {
                    self.state.select_prev();
                }
            }
            KeyCode::Enter if self.state.screen == Screen::Roster => {
                self.state.open_selected();
                self.refresh_view();
            }
            KeyCode::Char('c') | KeyCode::Tab => {
                if matches!(self.state.screen, Screen::Fighter { .. }) {
                    self.state.cycle_chart_next();
                }
            }
            KeyCode::Char('C') | KeyCode::BackTab => {
                if matches!(self.state.screen, Screen::Fighter { .. }) {
                    self.state.cycle_chart_prev();
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => {
                if matches!(self.state.screen, Screen::Fighter { .. }) {
                    self.state.back_to_roster();
                    self.view = None;
                }
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.clear_search(),
            KeyCode::Enter => self.state.search_active = false,
            KeyCode::Backspace => self.state.pop_search_char(),
            KeyCode::Char(ch) => self.state.push_search_char(ch),
            _ => {}
        }
    }

    fn refresh_view(&mut self) {
        let Some(fighter_id) = self.state.selected_fighter_id() else {
            self.view = None;
            return;
        };
        self.view = self.data.view(&fighter_id);
        if self.view.is_none() {
            self.state
                .push_log(format!("[WARN] No fighter data for id {fighter_id}"));
            self.state.back_to_roster();
        } else if let Some(view) = &self.view {
            if let Some(notice) = &view.notice {
                self.state.push_log(format!("[INFO] {notice}"));
            }
        }
    }

    fn log_max_scroll(&self) -> u16 {
        self.view
            .as_ref()
            .map(|v| v.log.len().saturating_sub(1) as u16)
            .unwrap_or(0)
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = SourceConfig::from_env();
    println!("Fetching fighter datasets...");
    let data = match DashboardData::load(&config) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("The dashboard cannot start without all three datasets.");
            std::process::exit(1);
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(data);
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

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
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
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &app.state.screen {
        Screen::Roster => render_roster(frame, chunks[1], app),
        Screen::Fighter { .. } => render_fighter(frame, chunks[1], app),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    match &app.view {
        Some(view) => format!(
            "MMA FIGHTER TERMINAL | {} ({})",
            view.info.full_name, view.info.record
        ),
        None => {
            let shown = app.state.filtered_indices().len();
            let total = app.state.roster.len();
            if app.state.search.is_empty() && !app.state.search_active {
                format!("MMA FIGHTER TERMINAL | {total} fighters")
            } else {
                format!(
                    "MMA FIGHTER TERMINAL | {shown}/{total} fighters | search: {}",
                    app.state.search
                )
            }
        }
    }
}

fn footer_text(state: &AppState) -> String {
    if state.search_active {
        return "Type to search | Enter Keep | Esc Clear".to_string();
    }
    match state.screen {
        Screen::Roster => {
            "j/k/↑/↓ Move | / Search | Enter Open | ? Help | q Quit".to_string()
        }
        Screen::Fighter { .. } => {
            "c/Tab Chart | j/k Scroll Log | b/Esc Back | ? Help | q Quit".to_string()
        }
    }
}

fn render_roster(frame: &mut Frame, area: Rect, app: &App) {
    let filtered = app.state.filtered_indices();
    if filtered.is_empty() {
        let empty = Paragraph::new("No fighters match the search")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }
    if area.height == 0 {
        return;
    }

    let visible = area.height as usize;
    let (start, end) = visible_range(app.state.selected, filtered.len(), visible);

    let mut lines = Vec::with_capacity(end - start);
    for idx in start..end {
        let entry = &app.state.roster[filtered[idx]];
        let prefix = if idx == app.state.selected { "> " } else { "  " };
        let line = match &entry.nickname {
            Some(nick) => format!("{prefix}{} \"{nick}\"", entry.full_name),
            None => format!("{prefix}{}", entry.full_name),
        };
        let style = if idx == app.state.selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::styled(line, style));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_fighter(frame: &mut Frame, area: Rect, app: &App) {
    let Some(view) = &app.view else {
        let empty = Paragraph::new("No fighter selected");
        frame.render_widget(empty, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(8)])
        .split(area);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(rows[0]);

    let info = Paragraph::new(info_text(view))
        .block(Block::default().title("Fighter Info").borders(Borders::ALL));
    frame.render_widget(info, panels[0]);

    let striking = Paragraph::new(stat_lines_text(&view.striking))
        .block(Block::default().title("Striking").borders(Borders::ALL));
    frame.render_widget(striking, panels[1]);

    let grappling = Paragraph::new(stat_lines_text(&view.grappling))
        .block(Block::default().title("Grappling").borders(Borders::ALL));
    frame.render_widget(grappling, panels[2]);

    if let Some(notice) = &view.notice {
        let warn = Paragraph::new(notice.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title("Notice").borders(Borders::ALL));
        frame.render_widget(warn, rows[1]);
        return;
    }

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    let log = Paragraph::new(fight_log_text(view))
        .block(
            Block::default()
                .title(format!("Fight Log ({} bouts)", view.log.len()))
                .borders(Borders::ALL),
        )
        .scroll((app.state.log_scroll, 0));
    frame.render_widget(log, lower[0]);

    if let Some(charts) = &view.charts {
        render_scatter(frame, lower[1], charts.get(app.state.chart_kind()));
    }
}

fn info_text(view: &FighterView) -> String {
    let info = &view.info;
    let mut lines = vec![format!("Name: {}", info.full_name)];
    if let Some(nick) = &info.nickname {
        lines.push(format!("Nickname: {nick}"));
    }
    lines.push(format!("Record: {}", info.record));
    lines.push(format!("DOB: {}", opt_str(&info.date_of_birth)));
    lines.push(format!("Height: {}", opt_str(&info.height)));
    lines.push(format!(
        "Weight: {}",
        info.weight
            .map(|w| format!("{w:.0}"))
            .unwrap_or_else(|| "--".to_string())
    ));
    lines.push(format!("Class: {}", opt_str(&info.weight_class)));
    lines.push(format!("Reach: {}", opt_str(&info.reach)));
    lines.push(format!("Stance: {}", opt_str(&info.stance)));
    lines.push(format!("UFCStats: {}", info.ufcstats_url));
    if let Some(espn) = &info.espn_url {
        lines.push(format!("ESPN: {espn}"));
    }
    lines.join("\n")
}

fn opt_str(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("--")
}

fn stat_lines_text(lines: &[StatLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}: {}", line.label, line.value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn fight_log_text(view: &FighterView) -> String {
    let mut lines = vec![format!(
        "{:<10} {:<18} {:<18} {:>3} {:>3} {:>6} {:>6} {:>4} {:>4} {:>5}",
        "Date", "Event", "Opponent", "W?", "Rnd", "Secs", "DK", "SS", "Str", "Ctrl"
    )];
    for row in &view.log {
        lines.push(format!(
            "{:<10} {:<18} {:<18} {:>3} {:>3} {:>6.0} {:>6} {:>4} {:>4} {:>5.0}",
            row.date.format("%Y-%m-%d"),
            truncate(&row.event, 18),
            truncate(&row.opponent, 18),
            if row.winner { "W" } else { "L" },
            row.round.as_deref().unwrap_or("-"),
            row.seconds,
            row.new_score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "-".to_string()),
            row.sig_strikes,
            row.strikes,
            row.control_seconds,
        ));
    }
    lines.join("\n")
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        return raw.to_string();
    }
    raw.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
}

fn render_scatter(frame: &mut Frame, area: Rect, scatter: &ScatterData) {
    if scatter.points.is_empty() {
        let empty = Paragraph::new("No comparable fighters in this class")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .title(chart_label(scatter.kind))
                    .borders(Borders::ALL),
            );
        frame.render_widget(empty, area);
        return;
    }

    let cohort: Vec<(f64, f64)> = scatter
        .points
        .iter()
        .filter(|p| !p.selected)
        .map(|p| (p.x, p.y))
        .collect();
    let highlighted: Vec<(f64, f64)> = scatter
        .points
        .iter()
        .filter(|p| p.selected)
        .map(|p| (p.x, p.y))
        .collect();

    let (x_bounds, y_bounds) = chart_bounds(scatter);

    let x_ref_line: Vec<(f64, f64)> = scatter
        .x_ref
        .map(|x| vec![(x, y_bounds[0]), (x, y_bounds[1])])
        .unwrap_or_default();
    let y_ref_line: Vec<(f64, f64)> = scatter
        .y_ref
        .map(|y| vec![(x_bounds[0], y), (x_bounds[1], y)])
        .unwrap_or_default();

    let mut datasets = vec![Dataset::default()
        .name("class")
        .marker(Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Gray))
        .data(&cohort)];
    if !x_ref_line.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(&x_ref_line),
        );
    }
    if !y_ref_line.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(&y_ref_line),
        );
    }
    datasets.push(
        Dataset::default()
            .name("selected")
            .marker(Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .data(&highlighted),
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(chart_label(scatter.kind))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title(scatter.x_label)
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds))
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .title(scatter.y_label)
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds))
                .style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(chart, area);
}

fn chart_bounds(scatter: &ScatterData) -> ([f64; 2], [f64; 2]) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for p in &scatter.points {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }
    for x in scatter.x_ref {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
    }
    for y in scatter.y_ref {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    ([pad_low(x_min), pad_high(x_max)], [pad_low(y_min), pad_high(y_max)])
}

fn pad_low(v: f64) -> f64 {
    (v - (v.abs() * 0.05).max(0.5)).max(0.0)
}

fn pad_high(v: f64) -> f64 {
    v + (v.abs() * 0.05).max(0.5)
}

fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    vec![
        Span::from(format!("{:.1}", bounds[0])),
        Span::from(format!("{mid:.1}")),
        Span::from(format!("{:.1}", bounds[1])),
    ]
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(1)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
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

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "MMA Fighter Terminal - Help",
        "",
        "Roster:",
        "  j/k or ↑/↓   Move",
        "  /            Search by name or nickname",
        "  Enter        Open fighter",
        "",
        "Fighter:",
        "  c / Tab      Next chart",
        "  C / S-Tab    Previous chart",
        "  j/k          Scroll fight log",
        "  b / Esc      Back to roster",
        "",
        "Global:",
        "  ?            Toggle help",
        "  q            Quit",
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
