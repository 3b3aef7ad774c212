mod app;
mod error;
mod model;
mod msg;
mod plugin;
mod scaffold;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use app::App;
use model::config::{AppConfig, project_dirs};
use msg::Msg;
use plugin::Catalog;

/// Servante is a presentation scaffolding tool.
#[derive(Parser)]
#[command(name = "servante", version)]
struct Cli {
    /// Project name (skips the name prompt)
    #[arg(long)]
    name: Option<String>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging to file (never stdout)
    let log_dir = project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "servante.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("servante=info")),
        )
        .init();

    tracing::info!("servante starting");

    let config = AppConfig::load()?;
    let plugins_dir = config.plugins_dir();
    let catalog = plugin::build_catalog(&plugins_dir)
        .with_context(|| format!("loading plugins from {}", plugins_dir.display()))?;
    if catalog.is_empty() {
        bail!("no plugins found in {}", plugins_dir.display());
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &config, plugins_dir, catalog, cli.name);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(app) => {
            if let Some(err) = app.failure() {
                eprintln!("servante error: {err}");
                return Ok(ExitCode::FAILURE);
            }
            if let Some(report) = app.report() {
                println!(
                    "All done. :) {} ({} rendered, {} copied)",
                    report.destination.display(),
                    report.rendered,
                    report.copied
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("event loop failed: {e:?}");
            eprintln!("servante error: {e:?}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &AppConfig,
    plugins_dir: PathBuf,
    catalog: Catalog,
    name_override: Option<String>,
) -> Result<App> {
    let (tx, rx) = mpsc::channel::<Msg>();
    let mut app = App::new(config, plugins_dir, catalog, name_override, tx.clone());

    // Input thread — reads terminal events and forwards as Msg
    let tx_input = tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event) = event::read() {
                let msg = match event {
                    Event::Key(k) => Msg::Key(k),
                    Event::Resize(..) => Msg::Resize,
                    _ => continue,
                };
                if tx_input.send(msg).is_err() {
                    break;
                }
            }
        }
    });

    // Tick thread — drives the spinner
    let tick = Duration::from_millis(config.ui.tick_ms.max(10));
    let tx_tick = tx.clone();
    thread::spawn(move || {
        loop {
            thread::sleep(tick);
            if tx_tick.send(Msg::Tick).is_err() {
                break;
            }
        }
    });

    terminal.draw(|f| app.view(f))?;

    // ── Main event loop ──
    loop {
        // Batch-drain all pending messages
        let first = rx.recv()?;
        app.update(first)?;

        while let Ok(msg) = rx.try_recv() {
            app.update(msg)?;
        }

        if app.should_quit {
            break;
        }

        terminal.draw(|f| app.view(f))?;
    }

    Ok(app)
}
