//! Config-driven TUI form builder for data-annotation tasks.
//!
//! Point the binary at a task's form config (TOML) to launch the
//! annotation view.  Run with `--check` to validate a config and exit
//! without touching the terminal.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Terminal};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::{ActiveView, AppState},
};
use crate::config::{FormConfig, UserConfig};
use crate::core::data::RecordStore;
use crate::ui::{form::FormView, layout::AppLayout, popup::HelpPopup, theme::Theme};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Config-driven annotation form TUI")]
struct Cli {
    /// Form configuration file (TOML).
    config: PathBuf,

    /// Records to annotate (JSONL). Overrides the config's `data.records`.
    #[arg(long)]
    data: Option<PathBuf>,

    /// File annotations are appended to (JSONL). Overrides `data.output`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Annotator name written into each saved annotation.
    #[arg(long, default_value = "default_user")]
    user: String,

    /// Validate the form config and exit.
    #[arg(long)]
    check: bool,
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();

    // ── build the form ────────────────────────────────────────
    // The whole (components, layout) pair is validated here; a malformed
    // config aborts startup with the offending id in the message.
    let form_config = FormConfig::load(&cli.config)?;
    let strategy = form_config.strategy()?;
    tracing::debug!(?strategy, "loaded form config {}", cli.config.display());
    let form = form_config.build()?;

    if cli.check {
        println!(
            "{}: OK ({} components, {:?} strategy)",
            cli.config.display(),
            form.registry.len(),
            strategy,
        );
        return Ok(());
    }

    let mut state = AppState::new(form, form_config.task.clone(), UserConfig::load());
    state.user = cli.user.clone();
    if !form_config.task.description.is_empty() {
        state.status_message = Some(form_config.task.description.clone());
    }
    state.output_path = cli.output.clone().or_else(|| form_config.data.output.clone());

    // ── load records ──────────────────────────────────────────
    let records_path = cli.data.clone().or_else(|| form_config.data.records.clone());
    if let Some(path) = records_path {
        let mut store = RecordStore::load(&path, &form_config.data.key_field)?;
        if let Some(output) = &state.output_path {
            store.load_annotated(output)?;
        }
        state.store = Some(store);
        state.sync_record();
    }

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let mut events = spawn_event_reader(Duration::from_millis(100));

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| {
            let layout = AppLayout::from_area(frame.area());

            let header = Paragraph::new(state.header_line()).style(Theme::title_style());
            frame.render_widget(header, layout.header_area);

            frame.render_widget(
                FormView::new(&state.form).focused(state.focused_id()),
                layout.form_area,
            );

            let hint = state.config.status_bar_hint();
            let status_text = state.status_message.as_deref().unwrap_or(&hint);
            let status = Paragraph::new(status_text).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);

            if state.active_view == ActiveView::Help {
                frame.render_widget(
                    HelpPopup {
                        config: &state.config,
                    },
                    frame.area(),
                );
            }
        })?;

        match events.recv().await {
            Some(AppEvent::Key(k)) => handler::handle_key(&mut state, k),
            Some(AppEvent::Resize(_, _)) | Some(AppEvent::Tick) => {}
            None => break, // event reader gone
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
