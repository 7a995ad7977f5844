pub mod app_dirs;
pub mod celebration;
pub mod feedback;
pub mod game;
pub mod math;
pub mod profile;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod ui;
pub mod util;

use crate::{
    celebration::RecordCelebration,
    feedback::{BellFeedback, FeedbackSink, SilentFeedback},
    game::{AnswerOutcome, Game},
    math::Difficulty,
    profile::{FileProfileStore, ProfileBook, ProfileStore},
    runtime::GameEvent,
    session::{SessionConfig, SessionSummary},
    stats::{OperatorSummary, StatsDb},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 50;
const NORMAL_CUE_INTERVAL_MS: u64 = 800;
const URGENT_CUE_INTERVAL_MS: u64 = 250;
const URGENT_TIME_FRACTION: f64 = 0.3;
const MAX_NAME_LEN: usize = 20;

/// timed true/false arithmetic quiz tui
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed true/false arithmetic quiz. Call the displayed answer right or wrong before the countdown runs out; streaks multiply your score and fast answers buy time back."
)]
pub struct Cli {
    /// difficulty preselected in the menu
    #[clap(short = 'd', long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// profile name to sign in as (created if missing, skips the account screen)
    #[clap(short = 'p', long)]
    profile: Option<String>,

    /// seed for the equation stream (reproducible sessions)
    #[clap(long)]
    seed: Option<u64>,

    /// disable terminal bell feedback
    #[clap(long)]
    mute: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Auth,
    Menu,
    Playing,
    GameOver,
    Profile,
}

pub struct App {
    pub cli: Cli,
    pub state: AppState,
    pub book: ProfileBook,
    pub store: FileProfileStore,
    pub difficulty: Difficulty,
    pub menu_index: usize,
    pub name_input: String,
    pub auth_index: usize,
    pub game: Option<Game>,
    pub last_summary: Option<SessionSummary>,
    pub celebration: RecordCelebration,
    pub profile_stats: Vec<OperatorSummary>,
    pub feedback: Box<dyn FeedbackSink>,
    last_tick: Instant,
    last_cue: Instant,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self::with_store(cli, FileProfileStore::new())
    }

    pub fn with_store(cli: Cli, store: FileProfileStore) -> Self {
        let mut book = store.load();

        let mut state = if book.active().is_some() {
            AppState::Menu
        } else {
            AppState::Auth
        };
        if let Some(name) = &cli.profile {
            book.sign_in(name, &mut rand::thread_rng());
            let _ = store.save(&book);
            state = AppState::Menu;
        }

        let feedback: Box<dyn FeedbackSink> = if cli.mute {
            Box::new(SilentFeedback)
        } else {
            Box::new(BellFeedback)
        };

        let difficulty = cli.difficulty;
        let menu_index = Difficulty::ALL
            .iter()
            .position(|d| *d == difficulty)
            .unwrap_or(1);

        Self {
            cli,
            state,
            book,
            store,
            difficulty,
            menu_index,
            name_input: String::new(),
            auth_index: 0,
            game: None,
            last_summary: None,
            celebration: RecordCelebration::new(),
            profile_stats: Vec::new(),
            feedback,
            last_tick: Instant::now(),
            last_cue: Instant::now(),
        }
    }

    pub fn start_game(&mut self) {
        let high_score = self
            .book
            .active()
            .map(|p| p.high_scores.get(self.difficulty))
            .unwrap_or(0);
        let config = SessionConfig {
            difficulty: self.difficulty,
            high_score,
            seed: self.cli.seed,
        };

        let mut game = Game::from_config(&config);
        if self.cli.seed.is_some() {
            game.stats_db = StatsDb::new().ok();
        }

        self.game = Some(game);
        self.state = AppState::Playing;
        self.last_tick = Instant::now();
        self.last_cue = Instant::now();
    }

    /// One heartbeat: advances the countdown with measured wall time and
    /// drives the cue cadence and any running celebration.
    pub fn on_tick(&mut self) {
        let elapsed_ms = self.last_tick.elapsed().as_secs_f64() * 1000.0;
        self.last_tick = Instant::now();

        self.celebration.update();

        if self.state != AppState::Playing {
            return;
        }
        let Some(game) = self.game.as_mut() else {
            return;
        };

        let urgent = game.time_fraction() < URGENT_TIME_FRACTION;
        let cue_interval = if urgent {
            URGENT_CUE_INTERVAL_MS
        } else {
            NORMAL_CUE_INTERVAL_MS
        };
        if self.last_cue.elapsed() >= Duration::from_millis(cue_interval) {
            self.feedback.countdown_tick(urgent);
            self.last_cue = Instant::now();
        }

        if game.on_tick(elapsed_ms) {
            self.feedback.answer_wrong();
            self.finish_game();
        }
    }

    fn submit(&mut self, says_correct: bool) {
        let Some(game) = self.game.as_mut() else {
            return;
        };

        match game.submit_answer(says_correct) {
            AnswerOutcome::Continued { record_broken, .. } => {
                self.feedback.answer_correct();
                if record_broken {
                    self.feedback.record_broken();
                }
            }
            AnswerOutcome::Ended { .. } => {
                self.feedback.answer_wrong();
                self.finish_game();
            }
            AnswerOutcome::Ignored => {}
        }
    }

    /// Folds the finished session into the signed-in profile and moves to
    /// the game-over screen.
    fn finish_game(&mut self) {
        let Some(game) = self.game.take() else {
            return;
        };
        let summary = game.summary();
        let _ = game.save_result();

        if let Some(profile) = self.book.active_mut() {
            profile.record_session(&summary);
        }
        let _ = self.store.save(&self.book);

        if summary.record_broken {
            self.feedback.record_broken();
            let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
            self.celebration.start(width, height);
        }

        self.last_summary = Some(summary);
        self.state = AppState::GameOver;
    }

    fn open_profile(&mut self) {
        self.profile_stats = StatsDb::new()
            .and_then(|db| db.operator_summary())
            .unwrap_or_default();
        self.state = AppState::Profile;
    }

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.state {
            AppState::Auth => self.handle_auth_key(key),
            AppState::Menu => self.handle_menu_key(key),
            AppState::Playing => self.handle_play_key(key),
            AppState::GameOver => self.handle_game_over_key(key),
            AppState::Profile => self.handle_profile_key(key),
        }
    }

    fn handle_auth_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Enter => {
                let name = self.name_input.trim().to_string();
                if !name.is_empty() {
                    self.book.sign_in(&name, &mut rand::thread_rng());
                    let _ = self.store.save(&self.book);
                    self.name_input.clear();
                    self.state = AppState::Menu;
                } else if let Some(profile) = self.book.profiles.get(self.auth_index) {
                    let id = profile.id.clone();
                    self.book.select(&id);
                    let _ = self.store.save(&self.book);
                    self.state = AppState::Menu;
                }
            }
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Up => self.auth_index = self.auth_index.saturating_sub(1),
            KeyCode::Down => {
                if !self.book.profiles.is_empty() {
                    self.auth_index = (self.auth_index + 1).min(self.book.profiles.len() - 1);
                }
            }
            KeyCode::Char(c) => {
                if self.name_input.len() < MAX_NAME_LEN
                    && (c.is_alphanumeric() || c == ' ' || c == '_' || c == '-')
                {
                    self.name_input.push(c);
                }
            }
            _ => {}
        }
        false
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Up => self.select_difficulty(self.menu_index.saturating_sub(1)),
            KeyCode::Down => {
                self.select_difficulty((self.menu_index + 1).min(Difficulty::ALL.len() - 1))
            }
            KeyCode::Char('1') => self.select_difficulty(0),
            KeyCode::Char('2') => self.select_difficulty(1),
            KeyCode::Char('3') => self.select_difficulty(2),
            KeyCode::Enter | KeyCode::Char(' ') => self.start_game(),
            KeyCode::Char('p') => self.open_profile(),
            KeyCode::Char('l') => {
                self.book.sign_out();
                let _ = self.store.save(&self.book);
                self.auth_index = 0;
                self.state = AppState::Auth;
            }
            _ => {}
        }
        false
    }

    fn select_difficulty(&mut self, index: usize) {
        self.menu_index = index.min(Difficulty::ALL.len() - 1);
        self.difficulty = Difficulty::ALL[self.menu_index];
    }

    fn handle_play_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            // Abandoning mid-session records nothing
            KeyCode::Esc => {
                self.game = None;
                self.state = AppState::Menu;
            }
            KeyCode::Left | KeyCode::Char('f') => self.submit(false),
            KeyCode::Right | KeyCode::Char('j') => self.submit(true),
            _ => {}
        }
        false
    }

    fn handle_game_over_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Char('r') => self.start_game(),
            KeyCode::Char('m') | KeyCode::Enter => self.state = AppState::Menu,
            KeyCode::Char('p') => self.open_profile(),
            _ => {}
        }
        false
    }

    fn handle_profile_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                self.state = AppState::Menu;
            }
            _ => {}
        }
        false
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = spawn_event_channel();

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match events.recv()? {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if app.handle_key(key) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn spawn_event_channel() -> mpsc::Receiver<GameEvent> {
    let (tx, rx) = mpsc::channel();

    let tick_tx = tx.clone();
    thread::spawn(move || loop {
        if tick_tx.send(GameEvent::Tick).is_err() {
            break;
        }
        thread::sleep(Duration::from_millis(TICK_RATE_MS));
    });

    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(Event::Key(key)) => Some(GameEvent::Key(key)),
            Ok(Event::Resize(_, _)) => Some(GameEvent::Resize),
            Ok(_) => None,
            Err(_) => break,
        };

        if let Some(evt) = evt {
            if tx.send(evt).is_err() {
                break;
            }
        }
    });

    rx
}
