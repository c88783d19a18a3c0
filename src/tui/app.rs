//! Interactive board screen for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state, handles
//! user input, renders the board, and hosts the recurrence scheduler: while
//! the UI is open the scheduler ticks on the event-loop cadence and commits
//! any due resets, so the board on screen is always consistent with the clock.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::board::{self, Board};
use crate::briefing;
use crate::fields::{Category, Frequency};
use crate::recurrence::{self, ResetScheduler};
use crate::task::Task;
use crate::tui::colors::{DONE_GREEN, INDIGO, SOS_RED, STALE_AMBER};
use crate::views;

/// Which screen is on top.
#[derive(Clone, Copy, PartialEq, Eq)]
enum AppState {
    Board,
    NewChore,
    ConfirmDelete,
    Briefing,
    Help,
}

/// Input form for a new chore.
struct ChoreForm {
    title: String,
    category_idx: usize,
    frequency_idx: usize,
    /// 0 = everyone, 1..=n = a single member.
    assign_idx: usize,
}

impl ChoreForm {
    fn new() -> Self {
        ChoreForm {
            title: String::new(),
            category_idx: 0,
            frequency_idx: 0,
            assign_idx: 0,
        }
    }

    fn category(&self) -> Category {
        Category::ALL[self.category_idx % Category::ALL.len()]
    }

    fn frequency(&self) -> Frequency {
        Frequency::ALL[self.frequency_idx % Frequency::ALL.len()]
    }
}

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    board: Board,
    board_path: PathBuf,
    scheduler: ResetScheduler,
    table_state: TableState,
    visible: Vec<u64>,
    active_view: Frequency,
    sos_only: bool,
    assignee_filter: Option<String>,
    show_done: bool,
    status_message: String,
    form: ChoreForm,
    briefing_text: String,
}

impl App {
    /// Create a new App, loading the board from the given path.
    pub fn new(board_path: &Path) -> Self {
        let board = Board::load(board_path, Local::now());
        let mut app = App {
            state: AppState::Board,
            board,
            board_path: board_path.to_path_buf(),
            scheduler: ResetScheduler::new(),
            table_state: TableState::default(),
            visible: Vec::new(),
            active_view: Frequency::Daily,
            sos_only: false,
            assignee_filter: None,
            show_done: false,
            status_message: String::new(),
            form: ChoreForm::new(),
            briefing_text: String::new(),
        };
        app.refresh_visible();
        app
    }

    fn save(&mut self) {
        if let Err(e) = self.board.save(&self.board_path) {
            self.status_message = format!("Save failed: {e}");
        }
    }

    /// Recompute the visible task list from the current filters.
    fn refresh_visible(&mut self) {
        let mut tasks = views::filter_tasks(
            &self.board.tasks,
            self.active_view,
            self.sos_only,
            self.assignee_filter.as_deref(),
        );
        if !self.show_done {
            tasks.retain(|t| !t.is_done);
        }
        self.visible = tasks.iter().map(|t| t.id).collect();
        let len = self.visible.len();
        match self.table_state.selected() {
            Some(i) if len > 0 => self.table_state.select(Some(i.min(len - 1))),
            _ if len > 0 => self.table_state.select(Some(0)),
            _ => self.table_state.select(None),
        }
    }

    fn selected_id(&self) -> Option<u64> {
        self.table_state
            .selected()
            .and_then(|i| self.visible.get(i).copied())
    }

    /// Commit a user mutation: re-evaluate recurrence, persist and refresh.
    fn commit(&mut self) {
        recurrence::run_pass(&mut self.board, Local::now());
        self.save();
        self.refresh_visible();
    }

    /// Run the scheduler tick. Commits and persists any due resets.
    fn tick(&mut self) {
        let resets = self.scheduler.on_tick(&mut self.board, Local::now());
        if resets > 0 {
            self.save();
            self.refresh_visible();
            self.status_message = format!("{resets} chore(s) came back around.");
        }
    }

    fn move_selection(&mut self, delta: i64) {
        if self.visible.is_empty() {
            return;
        }
        let len = self.visible.len() as i64;
        let current = self.table_state.selected().unwrap_or(0) as i64;
        let next = (current + delta).rem_euclid(len);
        self.table_state.select(Some(next as usize));
    }

    fn cycle_view(&mut self) {
        let idx = Frequency::ALL
            .iter()
            .position(|f| *f == self.active_view)
            .unwrap_or(0);
        self.active_view = Frequency::ALL[(idx + 1) % Frequency::ALL.len()];
        self.refresh_visible();
    }

    fn cycle_assignee_filter(&mut self) {
        let next = match &self.assignee_filter {
            None => self.board.users.first().map(|u| u.id.clone()),
            Some(current) => {
                let idx = self.board.users.iter().position(|u| &u.id == current);
                match idx {
                    Some(i) if i + 1 < self.board.users.len() => {
                        Some(self.board.users[i + 1].id.clone())
                    }
                    _ => None,
                }
            }
        };
        self.assignee_filter = next;
        self.refresh_visible();
        self.status_message = match &self.assignee_filter {
            Some(uid) => {
                let name = self
                    .board
                    .user(uid)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| uid.clone());
                format!("Showing chores for {name}.")
            }
            None => "Showing everyone's chores.".to_string(),
        };
    }

    fn toggle_selected_done(&mut self) {
        if let Some(id) = self.selected_id() {
            match self.board.toggle_done(id, Local::now()) {
                Some(true) => self.status_message = "★ Done. Nice work!".to_string(),
                Some(false) => self.status_message = "Back to pending.".to_string(),
                None => {}
            }
            self.commit();
        }
    }

    fn toggle_selected_sos(&mut self) {
        if let Some(id) = self.selected_id() {
            self.board.toggle_sos(id);
            let raised = self.board.get(id).map(|t| t.is_sos).unwrap_or(false);
            self.status_message = if raised {
                "SOS raised.".to_string()
            } else {
                "SOS cleared.".to_string()
            };
            self.commit();
        }
    }

    fn create_from_form(&mut self) {
        let assignees: Vec<String> = if self.form.assign_idx == 0 {
            self.board.users.iter().map(|u| u.id.clone()).collect()
        } else {
            self.board
                .users
                .get(self.form.assign_idx - 1)
                .map(|u| vec![u.id.clone()])
                .unwrap_or_default()
        };
        let created = self.board.create(
            &self.form.title,
            self.form.category(),
            self.form.frequency(),
            assignees,
            Local::now(),
        );
        match created {
            Some(_) => {
                self.active_view = self.form.frequency();
                self.commit();
                self.status_message = format!("Added '{}'.", self.form.title.trim());
                self.form = ChoreForm::new();
                self.state = AppState::Board;
            }
            None => {
                self.status_message = "A chore needs a title and an assignee.".to_string();
            }
        }
    }

    /// Handle keys on the main board.
    ///
    /// Returns true if the application should quit.
    fn handle_board_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected_done(),
            KeyCode::Char('s') => self.toggle_selected_sos(),
            KeyCode::Tab | KeyCode::Char('v') => self.cycle_view(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                self.active_view = Frequency::ALL[idx];
                self.refresh_visible();
            }
            KeyCode::Char('f') => {
                self.sos_only = !self.sos_only;
                self.refresh_visible();
            }
            KeyCode::Char('u') => self.cycle_assignee_filter(),
            KeyCode::Char('c') => {
                self.show_done = !self.show_done;
                self.refresh_visible();
            }
            KeyCode::Char('n') => {
                self.form = ChoreForm::new();
                self.state = AppState::NewChore;
            }
            KeyCode::Char('d') => {
                if self.selected_id().is_some() {
                    self.state = AppState::ConfirmDelete;
                }
            }
            KeyCode::Char('b') => {
                self.briefing_text = briefing::household_briefing(&self.board, Local::now());
                self.state = AppState::Briefing;
            }
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_form_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.state = AppState::Board,
            KeyCode::Enter => self.create_from_form(),
            KeyCode::Backspace => {
                self.form.title.pop();
            }
            KeyCode::Tab => {
                self.form.category_idx = (self.form.category_idx + 1) % Category::ALL.len();
            }
            KeyCode::Down => {
                self.form.frequency_idx = (self.form.frequency_idx + 1) % Frequency::ALL.len();
            }
            KeyCode::Up => {
                self.form.frequency_idx =
                    (self.form.frequency_idx + Frequency::ALL.len() - 1) % Frequency::ALL.len();
            }
            KeyCode::Right => {
                self.form.assign_idx = (self.form.assign_idx + 1) % (self.board.users.len() + 1);
            }
            KeyCode::Left => {
                let n = self.board.users.len() + 1;
                self.form.assign_idx = (self.form.assign_idx + n - 1) % n;
            }
            KeyCode::Char(c) => self.form.title.push(c),
            _ => {}
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    self.board.delete(id);
                    self.commit();
                    self.status_message = "Chore deleted.".to_string();
                }
                self.state = AppState::Board;
            }
            KeyCode::Char('n') | KeyCode::Esc => self.state = AppState::Board,
            _ => {}
        }
    }

    /// Poll for and handle keyboard events based on the current screen.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                match self.state {
                    AppState::Board => {
                        if self.handle_board_input(key.code) {
                            return Ok(true);
                        }
                    }
                    AppState::NewChore => self.handle_form_input(key.code),
                    AppState::ConfirmDelete => self.handle_confirm_input(key.code),
                    AppState::Briefing | AppState::Help => {
                        self.state = AppState::Board;
                    }
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let stats = views::completion_stats(&self.board);
        let sos = views::sos_count(&self.board.tasks);
        let mut spans = vec![
            Span::styled("CHOREWHEEL", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                Local::now().format("%A %d %b").to_string(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{}/{} done ({}%)", stats.completed, stats.total, stats.percentage),
                Style::default().fg(DONE_GREEN),
            ),
        ];
        if sos > 0 {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{sos} SOS"),
                Style::default().fg(SOS_RED).add_modifier(Modifier::BOLD),
            ));
        }
        if let Some(uid) = &self.assignee_filter {
            let name = self
                .board
                .user(uid)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| uid.clone());
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("[{name}]"),
                Style::default().fg(INDIGO),
            ));
        }
        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_view_tabs(&self, f: &mut Frame, area: Rect) {
        let counts = views::pending_by_frequency(&self.board.tasks);
        let mut spans = Vec::new();
        for (i, (frequency, pending)) in counts.iter().enumerate() {
            let label = format!(" {}:{} ({}) ", i + 1, board::frequency_view_label(*frequency), pending);
            let style = if *frequency == self.active_view {
                Style::default().bg(INDIGO).fg(Color::White).add_modifier(Modifier::BOLD)
            } else if *pending > 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
        }
        if self.sos_only {
            spans.push(Span::styled(
                " SOS ONLY ",
                Style::default().bg(SOS_RED).fg(Color::White),
            ));
        }
        let tabs = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(tabs, area);
    }

    fn task_row(&self, task: &Task) -> Row<'static> {
        let now = Local::now();
        let (state_mark, style) = if task.is_done {
            ("✓", Style::default().fg(DONE_GREEN))
        } else if task.is_sos {
            ("!", Style::default().fg(SOS_RED).add_modifier(Modifier::BOLD))
        } else if views::is_stale(task, now) {
            ("…", Style::default().fg(STALE_AMBER))
        } else {
            ("·", Style::default())
        };
        let names: Vec<&str> = task
            .assigned_to
            .iter()
            .map(|uid| {
                self.board
                    .user(uid)
                    .map(|u| u.name.as_str())
                    .unwrap_or(uid.as_str())
            })
            .collect();
        Row::new(vec![
            state_mark.to_string(),
            task.id.to_string(),
            board::truncate(&task.title, 40),
            board::format_category(task.category).to_string(),
            board::truncate(&names.join(","), 18),
        ])
        .style(style)
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        let header = Row::new(vec!["", "ID", "Title", "Category", "Assigned"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|id| self.board.get(*id))
            .map(|t| self.task_row(t))
            .collect();
        let title = format!(
            " {} board — {} chore(s) ",
            board::frequency_view_label(self.active_view),
            self.visible.len()
        );
        let table = Table::new(
            rows,
            [
                Constraint::Length(2),
                Constraint::Length(5),
                Constraint::Min(24),
                Constraint::Length(10),
                Constraint::Length(18),
            ],
        )
        .header(header)
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(title));
        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if self.status_message.is_empty() {
            "space done  s sos  n new  d delete  1-5/tab view  f sos-filter  u member  c completed  b briefing  ? help  q quit"
                .to_string()
        } else {
            self.status_message.clone()
        };
        f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Gray)), area);
    }

    fn render_form(&self, f: &mut Frame) {
        let area = centered_rect(54, 11, f.area());
        let assign_label = if self.form.assign_idx == 0 {
            "Everyone".to_string()
        } else {
            self.board
                .users
                .get(self.form.assign_idx - 1)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| "Everyone".to_string())
        };
        let lines = vec![
            Line::from(vec![
                Span::raw("Title:     "),
                Span::styled(
                    format!("{}_", self.form.title),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(format!(
                "Category:  {}   (Tab to change)",
                board::format_category(self.form.category())
            )),
            Line::from(format!(
                "Repeats:   {}   (Up/Down to change)",
                board::format_frequency(self.form.frequency())
            )),
            Line::from(format!("Assigned:  {assign_label}   (Left/Right to change)")),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to add, Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let popup = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" New chore "));
        f.render_widget(Clear, area);
        f.render_widget(popup, area);
    }

    fn render_confirm(&self, f: &mut Frame) {
        let title = self
            .selected_id()
            .and_then(|id| self.board.get(id))
            .map(|t| t.title.clone())
            .unwrap_or_default();
        let area = centered_rect(46, 5, f.area());
        let popup = Paragraph::new(format!("Delete '{title}'? (y/n)"))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Confirm "));
        f.render_widget(Clear, area);
        f.render_widget(popup, area);
    }

    fn render_briefing(&self, f: &mut Frame) {
        let area = centered_rect(60, 10, f.area());
        let popup = Paragraph::new(self.briefing_text.clone())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Household briefing "));
        f.render_widget(Clear, area);
        f.render_widget(popup, area);
    }

    fn render_help(&self, f: &mut Frame) {
        let area = centered_rect(56, 16, f.area());
        let lines: Vec<Line> = [
            "space/enter  toggle chore done",
            "s            raise/clear SOS",
            "n            new chore",
            "d            delete chore",
            "1-5, tab, v  switch frequency view",
            "f            pending-SOS filter",
            "u            cycle member filter",
            "c            show completed chores",
            "b            household briefing",
            "j/k, arrows  move selection",
            "q, esc       quit",
        ]
        .iter()
        .map(|s| Line::from(*s))
        .collect();
        let popup = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Keys "));
        f.render_widget(Clear, area);
        f.render_widget(popup, area);
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_view_tabs(f, chunks[1]);
        self.render_board(f, chunks[2]);
        self.render_status_bar(f, chunks[3]);

        match self.state {
            AppState::Board => {}
            AppState::NewChore => self.render_form(f),
            AppState::ConfirmDelete => self.render_confirm(f),
            AppState::Briefing => self.render_briefing(f),
            AppState::Help => self.render_help(f),
        }
    }

    /// Main event loop: scheduler tick, render, input, until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.tick();
            terminal.draw(|f| self.render(f))?;
            if self.handle_input()? {
                break;
            }
        }
        // Final save on teardown; dropping the app cancels the scheduler.
        self.board.save(&self.board_path)
    }
}

/// Set up the terminal, run the board UI, and restore the terminal.
pub fn run_tui(board_path: &Path) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(board_path);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

/// Centered popup rectangle of fixed character size, clamped to the frame.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
