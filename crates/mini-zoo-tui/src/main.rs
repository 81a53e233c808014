#![allow(clippy::too_many_arguments)]

mod animations;
mod app;
mod art;
mod images;
mod render;
mod theme;
mod viewport;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use images::ImageWorker;
use mini_zoo_core::{
    Catalog, Environment, FileBackend, GallerySource, ImageSource, PlaceholderSource,
    ProgressStore, Progression,
};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mini-zoo", version, about = "Drag-and-drop animal puzzles in the terminal")]
struct Args {
    /// Directory for saved progress
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory of animal pictures named after each animal (e.g. cow.png)
    #[arg(long)]
    gallery: Option<PathBuf>,

    /// Seed for piece scattering
    #[arg(long)]
    seed: Option<u64>,

    /// Keep progress in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Log file; the terminal itself is busy drawing the game
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. "info" or "mini_zoo_core=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("opening log file {}", path.display()))?;
    let filter = EnvFilter::try_new(level).with_context(|| format!("bad log filter {level:?}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| FileBackend::default_dir().join("mini-zoo.log"));
    init_tracing(&log_file, &args.log_level)?;

    let store = if args.ephemeral {
        ProgressStore::in_memory()
    } else {
        ProgressStore::for_environment(Environment::detect(), args.data_dir.clone())
    };
    let source: Box<dyn ImageSource> = match args.gallery.clone() {
        Some(dir) => Box::new(GallerySource::new(dir)),
        None => Box::new(PlaceholderSource),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(
        backend = store.backend_name(),
        images = source.source_name(),
        seed,
        "starting"
    );

    let game = Progression::new(Catalog::standard(), store, seed);
    let worker = ImageWorker::spawn(source);

    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )
    .context("entering alternate screen")?;

    let size = terminal::size().unwrap_or((80, 24));
    let mut app = App::new(game, worker, size);

    // Run the app
    let result = run_app(&mut stdout, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode().context("disabling raw mode")?;
    execute!(
        stdout,
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen,
        Show
    )
    .context("leaving alternate screen")?;

    result
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let tick_rate = app.get_tick_rate();

        render::render(stdout, app)?;
        stdout.flush()?;

        // Handle input with timeout for animation updates
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        break;
                    }

                    match app.handle_key(key) {
                        app::AppAction::Continue => {}
                        app::AppAction::Quit => break,
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::FocusLost => app.cancel_pointers(),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        // Tick animations and timers
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            app.tick(elapsed);
            last_tick = Instant::now();
        }
    }

    info!("quitting");
    Ok(())
}
