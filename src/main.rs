mod app;
mod clipboard;
mod config;
mod derive;
mod form;
mod logging;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{DefaultTerminal, Terminal};
use tracing::{debug, info};

use crate::app::App;
use crate::clipboard::SystemClipboard;

/// Walk through writing a well-formed question and copy a shareable summary.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Override the configured log level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start_time = Instant::now();

    // Initialize logging before anything else
    let logging_ctx = match logging::init() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    // Load configuration
    let mut loaded_config = config::load_config(cli.config.as_deref());
    if let Some(level) = cli.log_level {
        loaded_config.config.logging.level = level;
    }
    debug!(
        config_path = %loaded_config.config_path.display(),
        status = ?loaded_config.status,
        "config_loaded"
    );

    if let Some(ctx) = &logging_ctx {
        logging::set_level(&ctx.reload_handle, &loaded_config.config.logging.level);
        logging::cleanup_old_logs(&ctx.log_directory);
    }

    let clipboard = SystemClipboard::new(&loaded_config.config.clipboard.command);
    let app = App::new(
        &loaded_config,
        Box::new(clipboard),
        logging_ctx.as_ref().map(|ctx| ctx.session_id.clone()),
        logging_ctx.as_ref().map(|ctx| ctx.log_directory.clone()),
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

    let result = run_app(terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    if let Some(ctx) = &logging_ctx {
        info!(
            session_id = %ctx.session_id,
            duration_secs = start_time.elapsed().as_secs_f64(),
            "session_end"
        );
    }

    result
}

fn run_app(mut terminal: DefaultTerminal, mut app: App) -> Result<()> {
    loop {
        let now = Instant::now();
        app.tick(now);

        terminal.draw(|f| ui::draw_ui(f, &app, now))?;

        // Poll with a short timeout so the copied flag expires without input
        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key.code, key.modifiers, Instant::now());
                }
                Event::Resize(_, _) => {
                    // Terminal resized, will be handled in next draw
                }
                _ => {}
            }
        }

        if app.should_quit {
            info!("quit_requested");
            return Ok(());
        }
    }
}
