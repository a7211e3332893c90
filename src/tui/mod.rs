//! TUI module - Terminal dashboard with ratatui

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
};
use std::io::{stdout, Stdout};
use tracing::warn;

use crate::config::Config;
use crate::content::{ContentKey, ContentStore, MediaLibrary};
use crate::db::{DailyLog, Database, DEFAULT_USER};
use crate::exercises::{self, Exercise, DAYS, PROGRAM_SPLIT, REST};
use crate::metrics::{BodyMetrics, MetricsSummary};
use crate::session::{draft_key, Action, DraftValue, Page, Session, SetField};
use crate::workout_log::{SetInput, WorkoutLog};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const DEFAULT_REPS: f64 = 10.0;
const WEIGHT_STEP: f64 = 2.5;

/// App state for TUI
pub struct App {
    config: Config,
    content: ContentStore,
    media: MediaLibrary,
    log: WorkoutLog,
    session: Session,
    today: NaiveDate,
    /// Weekday cursor on the tracker page
    day_cursor: usize,
    /// Exercise cursor inside the selected workout
    exercise_cursor: usize,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let mut session = Session::default();
        session.weight_entries = previous_check_ins(&config);
        let today = Local::now().date_naive();
        Ok(Self {
            content: config.content_store(),
            media: config.media_library(),
            log: config.workout_log(),
            session,
            today,
            day_cursor: today.weekday().num_days_from_monday() as usize,
            exercise_cursor: 0,
            status: String::new(),
            should_quit: false,
            config,
        })
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn dispatch(&mut self, action: Action) {
        self.session = std::mem::take(&mut self.session).apply(action);
    }

    fn workout(&self) -> &'static [Exercise] {
        self.session
            .selected_workout
            .as_deref()
            .map(exercises::exercises_for_workout)
            .unwrap_or(&[])
    }

    fn selected_exercise(&self) -> Option<&'static Exercise> {
        self.workout().get(self.exercise_cursor)
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header with page tabs
        let titles: Vec<Line> = Page::ALL
            .iter()
            .enumerate()
            .map(|(i, p)| Line::from(format!("{} {}", i + 1, p.title())))
            .collect();
        let selected = Page::ALL.iter().position(|p| *p == self.session.page).unwrap_or(0);
        let mut title = String::from("Hourglass Fitness");
        if self.config.admin.is_enabled() {
            title.push_str(" [admin]");
        }
        let tabs = Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().fg(Color::Magenta).bold())
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(tabs, chunks[0]);

        match self.session.page {
            Page::Home => self.render_home(frame, chunks[1]),
            Page::WorkoutOverview => self.render_overview(frame, chunks[1]),
            Page::WorkoutTracker => self.render_tracker(frame, chunks[1]),
            Page::MealPlans => self.render_meal_plans(frame, chunks[1]),
            Page::WeightTracker => self.render_weight(frame, chunks[1]),
        }

        // Footer
        let help = match self.session.page {
            Page::WorkoutTracker => "q: quit | 1-5: pages | l: level | ←/→: day | enter: open | ↑/↓: exercise | +/-: reps | w/W: weight | space: done | s: save",
            _ => "q: quit | 1-5: pages | x: reset session data",
        };
        let footer_text = if self.status.is_empty() {
            help.to_string()
        } else {
            format!("{} | {}", self.status, help)
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn render_home(&self, frame: &mut Frame, area: Rect) {
        let photo = match self.media.coach_photo() {
            Some(path) => format!("Coach photo: {}", path.display()),
            None => "Coach photo: not uploaded".to_string(),
        };
        let lines = vec![
            Line::from("HOURGLASS FITNESS TRANSFORMATION").bold(),
            Line::from("12-week plan for booty, core, back & shoulders"),
            Line::from(""),
            Line::from(photo),
            Line::from(format!(
                "Welcome video: {}",
                self.content.resolve(&ContentKey::Intro).describe()
            )),
            Line::from(format!(
                "Getting started video: {}",
                self.content.resolve(&ContentKey::GettingStarted).describe()
            )),
            Line::from(""),
            Line::from(format!("Current level: {}", self.session.selected_level)),
            Line::from(format!("Exercises completed: {}", self.session.completed_exercises.len())),
            Line::from(format!("Weight entries: {}", self.session.weight_entries.len())),
        ];
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Welcome"));
        frame.render_widget(paragraph, area);
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = DAYS
            .iter()
            .enumerate()
            .map(|(i, day)| {
                Row::new(vec![
                    Cell::from(*day),
                    Cell::from(PROGRAM_SPLIT[0][i]),
                    Cell::from(PROGRAM_SPLIT[1][i]),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [Constraint::Length(12), Constraint::Min(20), Constraint::Min(20)],
        )
        .header(Row::new(vec!["Day", "Level 1", "Level 2"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Program split"));
        frame.render_widget(table, area);
    }

    fn render_tracker(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(8)])
            .split(area);

        let level = usize::from(self.session.selected_level.clamp(1, 2)) - 1;
        let today_idx = self.today.weekday().num_days_from_monday() as usize;
        let spans: Vec<Span> = DAYS
            .iter()
            .enumerate()
            .map(|(i, day)| {
                let mut style = Style::default();
                if i == today_idx {
                    style = style.fg(Color::Cyan);
                }
                if i == self.day_cursor {
                    style = style.reversed();
                }
                let label = if PROGRAM_SPLIT[level][i] == REST { "rest" } else { &day[..3] };
                Span::styled(format!(" {label} "), style)
            })
            .collect();
        let days = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Level {}", self.session.selected_level)),
        );
        frame.render_widget(days, chunks[0]);

        let workout_title = match (&self.session.selected_workout_day, &self.session.selected_workout) {
            (Some(day), Some(label)) => format!("{day}: {label}"),
            _ => "Select a workout day".to_string(),
        };
        let rows: Vec<Row> = self
            .workout()
            .iter()
            .enumerate()
            .map(|(i, ex)| {
                let video = match ContentKey::for_exercise(ex.name) {
                    Ok(key) => self.content.resolve(&key).describe(),
                    Err(_) => String::new(),
                };
                let done = self.session.completed_exercises.contains(&completion_key(i, ex));
                let row = Row::new(vec![
                    Cell::from(format!("{} {}", ex.category.emoji(), ex.name)),
                    Cell::from(ex.sets),
                    Cell::from(ex.working_sets().to_string()),
                    Cell::from(if done { "✅" } else { "" }),
                    Cell::from(video),
                ]);
                if i == self.exercise_cursor {
                    row.style(Style::default().reversed())
                } else {
                    row
                }
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(30),
                Constraint::Length(30),
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(20),
            ],
        )
        .header(Row::new(vec!["Exercise", "Sets", "Work", "", "Video"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title(workout_title));
        frame.render_widget(table, chunks[1]);

        let log_rows: Vec<Row> = match self.selected_exercise() {
            Some(ex) => self
                .log
                .query(self.today, &ex.id())
                .into_iter()
                .map(|e| {
                    Row::new(vec![
                        Cell::from(e.set_number.to_string()),
                        Cell::from(e.reps.to_string()),
                        Cell::from(format!("{:.1}", e.weight)),
                        Cell::from(if e.completed { "✅" } else { "" }),
                    ])
                })
                .collect(),
            None => Vec::new(),
        };
        let log_table = Table::new(
            log_rows,
            [Constraint::Length(5), Constraint::Length(6), Constraint::Length(8), Constraint::Min(3)],
        )
        .header(Row::new(vec!["Set", "Reps", "Weight", "Done"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Today's log"));
        frame.render_widget(log_table, chunks[2]);
    }

    fn render_meal_plans(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(vec![
            Line::from("Weekly meal plans: omnivore, pescatarian and vegan options."),
            Line::from("Log calories in and out on the Weight Tracker page."),
        ])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Meal Plans"));
        frame.render_widget(paragraph, area);
    }

    fn render_weight(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(5)])
            .split(area);

        let summary = MetricsSummary::from_entries(&self.session.weight_entries);
        let change = summary
            .weight_change
            .map(|c| format!("{c:+.1} lbs"))
            .unwrap_or_else(|| "N/A".to_string());
        let stats = Paragraph::new(Line::from(format!(
            "Weight change: {} | Avg net calories: {:.0} | Avg water: {:.1}L | Avg energy: {:.1}/10",
            change, summary.avg_net_calories, summary.avg_water, summary.avg_energy
        )))
        .block(Block::default().borders(Borders::ALL).title("Progress"));
        frame.render_widget(stats, chunks[0]);

        let mut entries: Vec<_> = self.session.weight_entries.iter().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        let rows: Vec<Row> = entries
            .into_iter()
            .map(|e| {
                Row::new(vec![
                    Cell::from(e.date.format("%Y-%m-%d").to_string()),
                    Cell::from(format!("{:.1}", e.weight)),
                    Cell::from(format!("{:.1}", e.waist)),
                    Cell::from(format!("{:.1}", e.hips)),
                    Cell::from(format!("{:.2}", e.water)),
                    Cell::from(e.net_calories.to_string()),
                    Cell::from(e.energy.to_string()),
                    Cell::from(format!("{:.1}", e.sleep)),
                ])
            })
            .collect();
        let table = Table::new(rows, [Constraint::Length(11); 8])
            .header(
                Row::new(vec!["Date", "Weight", "Waist", "Hips", "Water", "Net kcal", "Energy", "Sleep"])
                    .style(Style::default().bold()),
            )
            .block(Block::default().borders(Borders::ALL).title("History"));
        frame.render_widget(table, chunks[1]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.handle_key(key.code);
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.dispatch(Action::Navigate(Page::ALL[idx]));
                self.status.clear();
            }
            KeyCode::Char('x') => {
                self.dispatch(Action::ResetData);
                self.status = "Session data reset".to_string();
            }
            _ if self.session.page == Page::WorkoutTracker => self.handle_tracker_key(code),
            _ => {}
        }
    }

    fn handle_tracker_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('l') => {
                let next = if self.session.selected_level == 1 { 2 } else { 1 };
                self.dispatch(Action::SelectLevel(next));
                self.exercise_cursor = 0;
            }
            KeyCode::Left => self.day_cursor = (self.day_cursor + DAYS.len() - 1) % DAYS.len(),
            KeyCode::Right => self.day_cursor = (self.day_cursor + 1) % DAYS.len(),
            KeyCode::Enter => {
                let day = DAYS[self.day_cursor];
                if let Some(label) = exercises::workout_for(self.session.selected_level, day) {
                    self.dispatch(Action::SelectWorkout { day: day.to_string(), label: label.to_string() });
                    self.exercise_cursor = 0;
                }
            }
            KeyCode::Up => self.exercise_cursor = self.exercise_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.exercise_cursor + 1 < self.workout().len() {
                    self.exercise_cursor += 1;
                }
            }
            KeyCode::Char('+') => self.adjust_drafts(SetField::Reps, 1.0),
            KeyCode::Char('-') => self.adjust_drafts(SetField::Reps, -1.0),
            KeyCode::Char('w') => self.adjust_drafts(SetField::Weight, WEIGHT_STEP),
            KeyCode::Char('W') => self.adjust_drafts(SetField::Weight, -WEIGHT_STEP),
            KeyCode::Char(' ') => self.toggle_done(),
            KeyCode::Char('s') => self.save_selected(),
            _ => {}
        }
    }

    fn adjust_drafts(&mut self, field: SetField, delta: f64) {
        let Some(ex) = self.selected_exercise() else { return };
        let id = ex.id();
        let default = if field == SetField::Reps { DEFAULT_REPS } else { 0.0 };
        for set_number in 1..=ex.working_sets() {
            let key = draft_key(&id, self.today, set_number, field);
            let value = (self.session.draft_number(&key, default) + delta).max(0.0);
            self.dispatch(Action::SetDraft { key, value: DraftValue::Number(value) });
        }
        self.status = format!(
            "{}: {} reps @ {:.1} lbs",
            ex.name,
            self.session.draft_number(&draft_key(&id, self.today, 1, SetField::Reps), DEFAULT_REPS),
            self.session.draft_number(&draft_key(&id, self.today, 1, SetField::Weight), 0.0)
        );
    }

    fn toggle_done(&mut self) {
        let Some(ex) = self.selected_exercise() else { return };
        if ex.working_sets() == 0 {
            self.dispatch(Action::MarkCompleted(completion_key(self.exercise_cursor, ex)));
            return;
        }
        let id = ex.id();
        for set_number in 1..=ex.working_sets() {
            let key = draft_key(&id, self.today, set_number, SetField::Completed);
            let value = !self.session.draft_flag(&key);
            self.dispatch(Action::SetDraft { key, value: DraftValue::Flag(value) });
        }
    }

    fn save_selected(&mut self) {
        let Some(ex) = self.selected_exercise() else { return };
        let id = ex.id();
        if id.is_empty() || ex.working_sets() == 0 {
            self.status = format!("{} has no sets to log", ex.name);
            return;
        }

        let sets: Vec<SetInput> = (1..=ex.working_sets())
            .map(|n| SetInput {
                reps: self.session.draft_number(&draft_key(&id, self.today, n, SetField::Reps), DEFAULT_REPS) as u32,
                weight: self.session.draft_number(&draft_key(&id, self.today, n, SetField::Weight), 0.0),
                completed: self.session.draft_flag(&draft_key(&id, self.today, n, SetField::Completed)),
            })
            .collect();
        let outcome = self.log.append_sets(self.today, &id, ex.name, &sets);
        self.status = if outcome.all_saved() {
            format!("Saved {} sets!", outcome.saved)
        } else {
            format!("Saved {} sets, {} failed", outcome.saved, outcome.failed)
        };
        self.dispatch(Action::MarkCompleted(completion_key(self.exercise_cursor, ex)));
    }
}

/// Check-ins mirrored by earlier sessions; the mirror is optional
fn previous_check_ins(config: &Config) -> Vec<BodyMetrics> {
    let logs = Database::open(config.database())
        .and_then(|db| db.get_logs(DEFAULT_USER, "1900-01-01", "2999-12-31"));
    match logs {
        Ok(logs) => logs.iter().filter_map(DailyLog::to_metrics).collect(),
        Err(e) => {
            warn!("Body metrics mirror unavailable: {}", e);
            Vec::new()
        }
    }
}

/// Completion key of the exercise at `idx` within a workout
fn completion_key(idx: usize, ex: &Exercise) -> String {
    format!("ex_{}_{}", idx + 1, ex.name.replace(' ', "_"))
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
