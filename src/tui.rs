use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::app::BackendEvent;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Drives the "Carregando..." ellipsis
const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    /// Result of a request task, delivered in completion order
    Backend(BackendEvent),
}

impl AppEvent {
    fn from_terminal(event: Event) -> Option<Self> {
        match event {
            // release and repeat reports are dropped
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            _ => None,
        }
    }
}

/// Single queue the run loop reads from. Terminal input, ticks and request
/// outcomes all arrive here.
pub struct EventHandler {
    rx: UnboundedReceiver<AppEvent>,
    tx: UnboundedSender<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_terminal_events(tx.clone()));
        tokio::spawn(forward_ticks(tx.clone()));
        Self { rx, tx }
    }

    /// Sender handed to request tasks so their results join the event stream.
    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

async fn forward_terminal_events(tx: UnboundedSender<AppEvent>) {
    let mut stream = EventStream::new();
    while let Some(read) = stream.next().await {
        let Some(event) = read.ok().and_then(AppEvent::from_terminal) else {
            continue;
        };
        if tx.send(event).is_err() {
            return;
        }
    }
}

async fn forward_ticks(tx: UnboundedSender<AppEvent>) {
    let mut interval = tokio::time::interval(TICK_RATE);
    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            return;
        }
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stderr()))?)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Leave the alternate screen before the panic message is printed.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        previous(info);
    }));
}
