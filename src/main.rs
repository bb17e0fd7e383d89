//! Terminal 2048 runner (default binary).
//!
//! It uses crossterm for input and the framebuffer-based renderer from the
//! `term` crate. The auto-save is written on every way out of the loop:
//! the quit key, a termination signal, or a terminal error.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tui_2048::save::AutoSave;
use tui_2048::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tui_2048::{App, AppConfig, Args, Flow, ShutdownFlag, ShutdownWatcher};

/// Upper bound on how long a shutdown request waits for the loop to notice it.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::from_env().with_args(&args)?;
    if let Some(path) = &config.log_path {
        init_tracing(path)?;
    }
    info!(?config, "starting");

    let watcher = ShutdownWatcher::start()?;
    let autosave = if config.autosave_enabled {
        AutoSave::open_or_disabled(&config.autosave_path)
    } else {
        AutoSave::disabled(&config.autosave_path)
    };
    let mut app = App::new(&config, autosave);

    let mut term = TerminalRenderer::new();
    term.enter()?;
    let result = run(&mut term, &mut app, &watcher.flag());

    // Always try to restore terminal state.
    let _ = term.exit();

    match app.finish() {
        Ok(true) => info!(path = %config.autosave_path.display(), "auto-save written"),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "auto-save failed");
            eprintln!("tui-2048: auto-save failed: {e}");
        }
    }
    result
}

fn run(term: &mut TerminalRenderer, app: &mut App, shutdown: &ShutdownFlag) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut last = Instant::now();

    loop {
        if shutdown.is_requested() {
            return Ok(());
        }

        let viewport = term.viewport().unwrap_or(Viewport::new(80, 24));
        app.render_into(&view, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) == Flow::Quit {
                        return Ok(());
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        let now = Instant::now();
        app.tick(now.duration_since(last));
        last = now;
    }
}

/// Log to a file; the terminal itself belongs to the game screen.
fn init_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
