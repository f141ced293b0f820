mod cli;
mod config;
mod headless;
mod layers;

use crate::cli::Args;
use crate::config::{apply_overrides, load_dashboard_config};
use crate::layers::service::{init_tracing, Controller, HttpBackend, RiskBackend, SessionEvent};
use crate::layers::ui::{
    draw_ui, handle_key_event, handle_paste, restore_terminal, setup_terminal, AppState,
};
use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let headless = args.command.is_some();
    // The TUI owns the terminal, so stderr logging only applies to subcommands.
    let _file_guard = init_tracing(&args.log_dir, headless)?;
    if args.log_to_stderr && !headless {
        tracing::warn!("--log-to-stderr ignored in dashboard mode");
    }

    let mut config = load_dashboard_config(args.config.as_deref()).with_context(|| {
        match &args.config {
            Some(path) => format!("failed to load config {}", path.display()),
            None => "invalid default config".to_string(),
        }
    })?;
    apply_overrides(&mut config, &args)?;
    tracing::info!(backend = %config.backend.base_url, headless, "starting cupidsecure");

    let backend: Arc<dyn RiskBackend> = Arc::new(HttpBackend::new(&config.backend)?);

    if let Some(command) = args.command {
        let output = headless::run_command(command, &config, backend.as_ref()).await?;
        println!("{output}");
        return Ok(());
    }

    let (event_tx, mut event_rx) = mpsc::channel::<SessionEvent>(128);
    let controller = Controller::new(backend, event_tx, &config);

    let mut terminal = setup_terminal()?;
    let mut app = AppState::new(config.backend.base_url.clone());

    let tick_rate = Duration::from_millis(100);
    let outcome = loop {
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(&controller, event);
        }

        if let Err(err) = terminal.draw(|frame| draw_ui(frame, &mut app)) {
            break Err(err.into());
        }

        match poll_input(tick_rate) {
            Ok(Some(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                if handle_key_event(key, &mut app, &controller) {
                    break Ok(());
                }
            }
            Ok(Some(Event::Paste(text))) => handle_paste(&text, &mut app, &controller),
            Ok(_) => {}
            Err(err) => break Err(err),
        }
    };

    restore_terminal(&mut terminal)?;
    outcome
}

fn poll_input(tick_rate: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(tick_rate)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
