// src/main.rs

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

mod app;
mod config;
mod core;
mod logging;
mod ui;

use app::{App, AppState, Pane};
use crate::core::coordinator::RunCoordinator;
use crate::core::history::ScanHistory;
use crate::core::scanner::Auditor;
use crate::core::session::SshConnector;
use crate::core::store::JsonFileStore;
use crate::core::worker::{ScanWorker, WorkerEvent};

/// Engine handles the event loop needs.
struct Engine {
    worker: ScanWorker,
    history: ScanHistory,
    coordinator: Arc<RunCoordinator>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = crate::config::AuditConfig::from_env()?;
    let data_dir = logging::get_data_dir(config.data_dir.as_deref());
    logging::initialize_logging(&data_dir)?;
    info!(data_dir = %data_dir.display(), "Starting warden.");

    let store = Arc::new(JsonFileStore::new(&data_dir)?);
    let history = ScanHistory::new(store);
    let coordinator = RunCoordinator::new();
    let connector = Arc::new(SshConnector::new(config.ssh_timeout()));
    let auditor = Auditor::new(config, connector);
    let (worker, mut events) = ScanWorker::spawn(auditor, history.clone(), coordinator.clone());
    let engine = Engine { worker, history, coordinator };

    let mut app = App::new();
    refresh_history(&mut app, &engine.history);
    match engine.history.current() {
        Ok(Some(report)) => app.show_report(report, false),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Could not load the current report."),
    }

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let outcome = run(&mut terminal, &mut app, &engine, &mut events);

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    info!("Warden stopped.");
    outcome
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    engine: &Engine,
    events: &mut mpsc::Receiver<WorkerEvent>,
) -> Result<()> {
    while !app.should_quit {
        app.on_tick(engine.coordinator.status());
        terminal.draw(|frame| ui::render(app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(app, engine)?;
        }

        if let Ok(event) = events.try_recv() {
            match event {
                WorkerEvent::Completed(report) => {
                    app.notice = None;
                    app.show_report(report, false);
                }
                WorkerEvent::Unsaved { report, reason } => {
                    app.notice = Some(format!("Report not saved: {}", reason));
                    app.show_report(report, false);
                }
            }
            refresh_history(app, &engine.history);
        }
    }
    Ok(())
}

fn refresh_history(app: &mut App, history: &ScanHistory) {
    match history.list() {
        Ok(entries) => app.set_history(entries),
        Err(e) => {
            error!(error = %e, "Could not load scan history.");
            app.notice = Some(e.to_string());
        }
    }
}

fn handle_events(app: &mut App, engine: &Engine) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if app.show_disclaimer {
            match key.code {
                KeyCode::Enter => app.show_disclaimer = false,
                KeyCode::Esc => app.quit(),
                _ => {}
            }
            return Ok(());
        }
        match key.code {
            KeyCode::Esc => app.quit(),
            KeyCode::Tab => app.next_pane(),
            KeyCode::Up => app.scroll_up(),
            KeyCode::Down => app.scroll_down(),
            _ => match app.pane {
                Pane::Form => handle_form_input(app, key.code, engine),
                Pane::Findings => {
                    if key.code == KeyCode::Char('q') {
                        app.quit();
                    }
                }
                Pane::History => handle_history_input(app, key.code, &engine.history),
            },
        }
    }
    Ok(())
}

fn handle_form_input(app: &mut App, key_code: KeyCode, engine: &Engine) {
    match key_code {
        KeyCode::F(2) => app.form.toggle_auth(),
        KeyCode::Char(c) => app.form.push(c),
        KeyCode::Backspace => app.form.pop(),
        KeyCode::Enter => {
            let request = match app.form.to_request() {
                Ok(request) => request,
                Err(message) => {
                    app.notice = Some(message);
                    return;
                }
            };
            match engine.worker.submit(request) {
                Ok(()) => {
                    app.notice = None;
                    app.state = AppState::Scanning;
                }
                Err(e) => app.notice = Some(e.to_string()),
            }
        }
        _ => {}
    }
}

fn handle_history_input(app: &mut App, key_code: KeyCode, history: &ScanHistory) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Enter => {
            let Some(scan_id) = app.selected_history_id() else { return };
            match history.get(&scan_id) {
                Ok(Some(report)) => app.show_report(report, true),
                Ok(None) => app.notice = Some(format!("Scan {} is no longer in history", scan_id)),
                Err(e) => app.notice = Some(e.to_string()),
            }
        }
        KeyCode::Char('c') => match history.current() {
            Ok(Some(report)) => app.show_report(report, false),
            Ok(None) => {}
            Err(e) => app.notice = Some(e.to_string()),
        },
        _ => {}
    }
}
