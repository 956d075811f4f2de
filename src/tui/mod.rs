//! Terminal file tree
//!
//! Browse a report's extracted files as a checkbox tree, toggle the display
//! filters and highlights, and print the selection on exit. The report file
//! is watched and reloaded when it changes.

pub mod app;
pub mod events;
pub mod ui;
pub mod widget;

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{poll, read, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notify::{Config as WatchConfig, RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::prelude::*;

use crate::config::Config;
use crate::filetree::SelectedFile;

use app::App;
use events::handle_event;

pub use widget::{CheckState, TerminalTreeWidget, TreeRow};

/// Run the TUI; returns the selection when the user confirmed it with Enter
pub fn run(
    report_path: PathBuf,
    prenormalized: bool,
    config: &Config,
) -> Result<Option<Vec<SelectedFile>>, Box<dyn std::error::Error>> {
    // Load before touching the terminal so errors print normally
    let mut app = App::new(report_path, prenormalized, config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app, ensuring cleanup happens even on error
    let result = run_app_inner(&mut terminal, &mut app);

    // Restore terminal - this MUST run even if app fails
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result.map(|()| app.confirmed.take())
}

fn run_app_inner<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    // Setup file watcher for auto-reload
    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                if event.kind.is_modify() || event.kind.is_create() {
                    let _ = tx.send(());
                }
            }
        },
        WatchConfig::default(),
    )?;
    watcher.watch(app.report_path(), RecursiveMode::NonRecursive)?;

    run_event_loop(terminal, app, rx)
}

fn run_event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    file_change_rx: mpsc::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;
        // First frame is up
        app.tree.widget_mut().mark_ready();

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if poll(timeout)? {
            match read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_event(app, key) {
                        return Ok(()); // Quit signal
                    }
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        // Coalesce bursts of write events into one reload
        if file_change_rx.try_recv().is_ok() {
            while file_change_rx.try_recv().is_ok() {}
            app.reload_report();
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }
}
