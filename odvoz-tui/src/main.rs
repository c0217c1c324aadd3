//! Terminal UI for odvoz that shows municipal waste pickup schedules.

mod app;
mod input;
mod settings_file;
mod ui;

use std::{io, path::PathBuf, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use odvoz_core::{
    model::{MunicipalityId, Settings},
    ports::{ScheduleProvider as _, SettingsStore},
    session::ScheduleSession,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::input::Action;
use crate::settings_file::JsonSettingsStore;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_logging();

    // HTTP + backend setup
    let client = Client::builder().user_agent("odvoz/0.1").build()?;
    let api = odvoz_provider_cityapi::connect(client);

    // Persisted settings; a corrupt file falls back to defaults.
    let settings_store = JsonSettingsStore::new(JsonSettingsStore::default_path());
    let settings = settings_store.load().unwrap_or_else(|err| {
        warn!(error = %err, "falling back to default settings");
        Settings::default()
    });

    let mut startup_error = None;
    let municipalities = match api.directory.list_municipalities().await {
        Ok(municipalities) => municipalities,
        Err(err) => {
            startup_error = Some(format!("Failed to list municipalities: {err}"));
            Vec::new()
        }
    };

    // Session + startup auto-select of the previously chosen municipality
    let mut session = ScheduleSession::new(Arc::clone(&api.schedules));
    if let Some(id) = settings.selected_municipality_id.clone()
        && let Err(err) = session.select_municipality(id).await
    {
        startup_error = Some(format!("Failed to load schedule: {err}"));
    }

    // App state
    let mut app = App::new(session, api.schedules, settings_store, settings, municipalities);
    app.error_message = startup_error;

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        app.refresh_views();
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::SelectMunicipality => {
                    let Some(id) = app.select_current_municipality() else {
                        app.error_message = Some("No municipality to select".into());
                        continue;
                    };
                    load_schedule(terminal, &mut app, id).await?;

                    // Remember the choice for the next start.
                    app.settings.selected_municipality_id =
                        app.session.selected_municipality().cloned();
                    if let Err(err) = app.settings_store.save(&app.settings) {
                        warn!(error = %err, "failed to persist municipality choice");
                    }
                }
                Action::Refresh => {
                    let Some(id) = app.session.selected_municipality().cloned() else {
                        app.error_message = Some("Select a municipality first".into());
                        continue;
                    };
                    load_schedule(terminal, &mut app, id).await?;
                }
                Action::SaveSettings => match app.settings_store.save(&app.settings) {
                    Ok(()) => {
                        app.error_message = None;
                    }
                    Err(err) => {
                        app.error_message = Some(format!("Failed to save settings: {err}"));
                    }
                },
            }
        }
    }

    Ok(())
}

async fn load_schedule(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    id: MunicipalityId,
) -> Result<()> {
    app.error_message = None;

    // Redraw once so the loading state is visible during the fetch.
    let ticket = app.session.begin_select(id.clone());
    app.refresh_views();
    terminal.draw(|frame| ui::draw(frame, app))?;

    // The session discards this outcome if another selection has been
    // issued in the meantime.
    let outcome = app.schedules.fetch_schedule(&id).await;
    if let Err(err) = app.session.apply_fetch(ticket, outcome) {
        app.error_message = Some(format!("Failed to load schedule: {err}"));
    }
    app.refresh_views();
    Ok(())
}

fn init_logging() -> WorkerGuard {
    let log_dir = std::env::var_os("ODVOZ_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    let file_appender = tracing_appender::rolling::never(log_dir, "odvoz.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    // The terminal belongs to ratatui, so logs go to a file only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}
