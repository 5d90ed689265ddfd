use anyhow::Result;
use clap::Parser;
use cli::Cli;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dbcview::app::App;
use dbcview::config::Config;
use dbcview::engine::{notification_channel, JsonEngine};
use dbcview::session::SessionCoordinator;
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());
    if cli.write_config {
        let path = config.save(cli.config.as_deref())?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let (events, notifications) = notification_channel();
    let engine = Arc::new(JsonEngine::new(events));
    let session = SessionCoordinator::new(engine, notifications)
        .with_default_view(config.session.default_view);
    log::info!("Starting dbcview with {} file(s)", cli.files.len());

    if cli.summary {
        return print_summaries(session, cli.files).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(session, config);
    app.open_paths(cli.files).await;
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Handle any errors from the app
    if let Err(e) = result {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }

    Ok(())
}

/// Load `files` and print one summary per loaded document
async fn print_summaries(
    mut session: SessionCoordinator<JsonEngine>,
    files: Vec<PathBuf>,
) -> Result<()> {
    let mut failed = 0;
    for path in files {
        if let Err(e) = session.request_open(path.clone()).await {
            eprintln!("{}: {}", path.display(), e);
            failed += 1;
        }
    }
    if let Some(result) = session.process_pending().await {
        result?;
    }

    for summary in &session.snapshot().files {
        println!("{}", summary);
    }

    if failed > 0 {
        anyhow::bail!("{} file(s) could not be loaded", failed);
    }
    Ok(())
}
