use anyhow::Result;
use tracing::{info, warn};

use integration_hub::app::App;
use integration_hub::config::Config;
use integration_hub::tui::{self, EventHandler, Tui};
use integration_hub::{handler, logging, ui};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is best effort; the UI works without it
    if let Err(e) = logging::init() {
        eprintln!("warning: file logging disabled: {}", e);
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });
    let settings = config.resolve();
    info!(base_url = %settings.base_url, model = %settings.chat_model, "starting");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(&settings, events.sender());
    app.check_health();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    info!("exiting");
    Ok(())
}
