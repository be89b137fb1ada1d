use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use clikr::{
    app::{App, Flow},
    context::AppContext,
    feedback::Bell,
    runtime::{CrosstermEventSource, Runner},
    schedule::IntervalSchedule,
    session::{is_allowed_duration, ALLOWED_DURATIONS, DEFAULT_DURATION_SECS},
    settings::{IdleClickPolicy, Theme},
    store::{KeyValueStore, MemoryStore, SqliteStore},
    ui::{layout, screen::draw},
};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use tracing_subscriber::EnvFilter;

const FRAME_MS: u64 = 50;

/// click speed test tui with cps history, achievements, and themes
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A click speed test for the terminal: click (or press space) as fast as you can before the timer runs out. Keeps your last ten scores, tracks achievements, and remembers your settings."
)]
pub struct Cli {
    /// length of a run in seconds (5, 10, 15 or 30)
    #[clap(short, long, default_value_t = DEFAULT_DURATION_SECS, value_parser = parse_duration)]
    duration: u32,

    /// color theme (overrides the saved one)
    #[clap(short, long, value_enum)]
    theme: Option<Theme>,

    /// do not start a run when clicking outside of one; use enter instead
    #[clap(long)]
    ignore_idle_clicks: bool,

    /// path of the database holding scores and settings
    #[clap(long)]
    db: Option<PathBuf>,

    /// write diagnostics to this file (filter with RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// keep everything in memory; nothing is saved
    #[clap(long, conflicts_with = "db")]
    memory: bool,
}

fn parse_duration(value: &str) -> Result<u32, String> {
    let secs: u32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number of seconds"))?;
    if is_allowed_duration(secs) {
        Ok(secs)
    } else {
        Err(format!("duration must be one of {ALLOWED_DURATIONS:?}"))
    }
}

impl Cli {
    fn idle_click_policy(&self) -> IdleClickPolicy {
        if self.ignore_idle_clicks {
            IdleClickPolicy::Ignore
        } else {
            IdleClickPolicy::Start
        }
    }
}

/// Logging goes to a file only; the terminal belongs to the TUI.
fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| err as Box<dyn Error>)?;
    Ok(())
}

fn open_store(cli: &Cli) -> Box<dyn KeyValueStore> {
    if cli.memory {
        return Box::new(MemoryStore::new());
    }

    let opened = match &cli.db {
        Some(path) => SqliteStore::open(path),
        None => SqliteStore::open_default(),
    };
    match opened {
        Ok(store) => Box::new(store),
        Err(err) => {
            tracing::warn!(error = %err, "could not open store, nothing will be saved");
            Box::new(MemoryStore::new())
        }
    }
}

fn build_context(cli: &Cli) -> AppContext {
    let mut context = AppContext::load(open_store(cli));
    if let Some(theme) = cli.theme {
        context.set_theme(theme);
    }
    context.set_idle_click_policy(cli.idle_click_policy());
    context
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let context = build_context(&cli);
    let mut app = App::new(
        context,
        Box::new(IntervalSchedule::every_second()),
        cli.duration,
        Bell::stdout(false),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "tui exited with an error");
    }
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new()?,
        Duration::from_millis(FRAME_MS),
    );

    loop {
        terminal.draw(|f| draw(app, f))?;

        let event = runner.step();
        let size = terminal.size()?;
        let click_area = layout(Rect::new(0, 0, size.width, size.height)).click_area;

        if app.handle_event(event, click_area, Instant::now()) == Flow::Quit {
            tracing::info!("quitting");
            return Ok(());
        }
    }
}
