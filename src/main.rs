mod app;
mod cli;
mod config;
mod location;
mod logging;
mod preview;
mod query;
mod state;
mod ui;
mod wizard;

use anyhow::Result;
use app::App;
use clap::Parser;
use cli::Cli;
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::info;

fn main() -> Result<()> {
    let config = Config::from_cli(Cli::parse())?;
    let _log_guard = logging::init(&config.log_dir)?;
    info!(log_dir = %config.log_dir.display(), "starting casafinder");

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Some(payload) = result? {
        println!("{}", payload.to_pretty_json()?);
    }
    Ok(())
}

/// Returns the last confirmed query, if any.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
) -> Result<Option<query::QueryPayload>> {
    let mut app = App::new(config);

    loop {
        app.tick();
        terminal.draw(|frame| ui::draw(frame, &app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    app.handle_key(key);
                    if app.should_quit {
                        break;
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse, terminal.size()?),
                _ => {}
            }
        }
    }

    info!(confirmed = app.submitted.is_some(), "session ended");
    Ok(app.submitted)
}
