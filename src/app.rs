use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::backend::BackendClient;
use crate::config::Settings;
use crate::exchange;
use crate::session::{ChatSession, CompletionSession};
use crate::state::Message;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Chat,
    Completions,
}

impl Screen {
    pub fn all() -> [Screen; 3] {
        [Screen::Home, Screen::Chat, Screen::Completions]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Chat => "Chat",
            Screen::Completions => "Completions",
        }
    }

    pub fn next(&self) -> Screen {
        match self {
            Screen::Home => Screen::Chat,
            Screen::Chat => Screen::Completions,
            Screen::Completions => Screen::Home,
        }
    }

    pub fn prev(&self) -> Screen {
        match self {
            Screen::Home => Screen::Completions,
            Screen::Chat => Screen::Home,
            Screen::Completions => Screen::Chat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Focused control of the completion form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionField {
    #[default]
    Prompt,
    Temperature,
    MaxTokens,
}

impl CompletionField {
    pub fn next(&self) -> Self {
        match self {
            CompletionField::Prompt => CompletionField::Temperature,
            CompletionField::Temperature => CompletionField::MaxTokens,
            CompletionField::MaxTokens => CompletionField::MaxTokens,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            CompletionField::Prompt => CompletionField::Prompt,
            CompletionField::Temperature => CompletionField::Prompt,
            CompletionField::MaxTokens => CompletionField::Temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Unknown,
    Online,
    Offline,
}

/// Results sent back by background request tasks
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    ChatReply(Message),
    CompletionReply(String),
    Health(bool),
    Models(Vec<String>),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub health: Health,

    // Chat screen
    pub chat: ChatSession,
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript panel
    pub chat_width: u16,  // inner width, for wrap calculations
    pub chat_area: Option<Rect>,

    // Completions screen
    pub completion: CompletionSession,
    pub completion_field: CompletionField,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Model picker state
    pub show_model_picker: bool,
    pub available_models: Vec<String>,
    pub model_picker_state: ListState,

    client: BackendClient,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(settings: &Settings, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            health: Health::Unknown,

            chat: ChatSession::new(&settings.chat_model),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,

            completion: CompletionSession::new(settings.completion),
            completion_field: CompletionField::default(),

            animation_frame: 0,

            show_model_picker: false,
            available_models: Vec::new(),
            model_picker_state: ListState::default(),

            client: BackendClient::new(&settings.base_url, &settings.api_token),
            events,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Busy flag of the screen currently shown
    pub fn is_busy(&self) -> bool {
        match self.screen {
            Screen::Home => false,
            Screen::Chat => self.chat.is_busy(),
            Screen::Completions => self.completion.is_busy(),
        }
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = InputMode::Normal;
    }

    /// Send the chat input in the background. Returns false when the submit
    /// control is disabled (busy, or nothing typed).
    pub fn submit_chat(&mut self) -> bool {
        if !self.chat.can_submit() {
            return false;
        }
        let Some(submission) = self.chat.submit() else {
            return false;
        };
        self.scroll_chat_to_bottom();

        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let reply = exchange::run_chat(&client, submission).await;
            let _ = tx.send(AppEvent::Backend(BackendEvent::ChatReply(reply)));
        });
        true
    }

    pub fn submit_completion(&mut self) -> bool {
        if !self.completion.can_submit() {
            return false;
        }
        let Some(request) = self.completion.submit() else {
            return false;
        };

        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let text = exchange::run_completion(&client, request).await;
            let _ = tx.send(AppEvent::Backend(BackendEvent::CompletionReply(text)));
        });
        true
    }

    pub fn check_health(&self) {
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let online = match client.health().await {
                Ok(online) => online,
                Err(e) => {
                    warn!(error = %e, "health check failed");
                    false
                }
            };
            let _ = tx.send(AppEvent::Backend(BackendEvent::Health(online)));
        });
    }

    /// Fetch the model list for the picker; falls back to the current model.
    pub fn request_models(&self) {
        let client = self.client.clone();
        let tx = self.events.clone();
        let current = self.chat.model().to_string();
        tokio::spawn(async move {
            let models = match client.list_models().await {
                Ok(models) if !models.is_empty() => models,
                Ok(_) => vec![current],
                Err(e) => {
                    warn!(error = %e, "could not list models");
                    vec![current]
                }
            };
            let _ = tx.send(AppEvent::Backend(BackendEvent::Models(models)));
        });
    }

    pub fn apply(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::ChatReply(reply) => {
                self.chat.finish(reply);
                self.scroll_chat_to_bottom();
            }
            BackendEvent::CompletionReply(text) => self.completion.finish(text),
            BackendEvent::Health(online) => {
                self.health = if online { Health::Online } else { Health::Offline };
            }
            BackendEvent::Models(models) => self.open_model_picker(models),
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll the transcript so the newest entry (or the loading line) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;

        for msg in self.chat.transcript() {
            total_lines = total_lines.saturating_add(1); // sender label
            for line in msg.text.lines() {
                let wrapped = line.chars().count() / wrap_width + 1;
                total_lines = total_lines.saturating_add(wrapped);
            }
            if msg.image.is_some() {
                total_lines = total_lines.saturating_add(1);
            }
            total_lines = total_lines.saturating_add(1); // blank line after message
        }

        if self.chat.is_busy() {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = u16::try_from(total_lines)
            .unwrap_or(u16::MAX)
            .saturating_sub(visible_height);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    fn open_model_picker(&mut self, models: Vec<String>) {
        self.available_models = models;
        if self.available_models.is_empty() {
            return;
        }
        // Select current model if in list, otherwise first
        let current_idx = self
            .available_models
            .iter()
            .position(|m| m == self.chat.model())
            .unwrap_or(0);
        self.model_picker_state.select(Some(current_idx));
        self.show_model_picker = true;
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = self.available_models.len();
        if len > 0 {
            let i = self.model_picker_state.selected().unwrap_or(0);
            self.model_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    /// Apply the highlighted model to the chat session and close the picker.
    /// Returns the model chosen so the caller can persist it.
    pub fn select_model(&mut self) -> Option<String> {
        let model = self
            .model_picker_state
            .selected()
            .and_then(|i| self.available_models.get(i))
            .cloned()?;
        debug!(%model, "chat model selected");
        self.chat.set_model(&model);
        self.show_model_picker = false;
        Some(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let settings = Config::new().resolve_with(|_| None);
        (App::new(&settings, tx), rx)
    }

    #[test]
    fn screens_cycle_both_ways() {
        for screen in Screen::all() {
            assert_eq!(screen.next().prev(), screen);
        }
    }

    #[test]
    fn completion_fields_stop_at_the_ends() {
        assert_eq!(CompletionField::Prompt.prev(), CompletionField::Prompt);
        assert_eq!(CompletionField::MaxTokens.next(), CompletionField::MaxTokens);
        assert_eq!(CompletionField::Prompt.next().next(), CompletionField::MaxTokens);
    }

    #[test]
    fn health_event_updates_header_state() {
        let (mut app, _rx) = test_app();
        assert_eq!(app.health, Health::Unknown);
        app.apply(BackendEvent::Health(false));
        assert_eq!(app.health, Health::Offline);
        app.apply(BackendEvent::Health(true));
        assert_eq!(app.health, Health::Online);
    }

    #[test]
    fn model_picker_preselects_current_model() {
        let (mut app, _rx) = test_app();
        app.apply(BackendEvent::Models(vec![
            "gpt-4o".to_string(),
            "gpt-3.5-turbo".to_string(),
        ]));
        assert!(app.show_model_picker);
        assert_eq!(app.model_picker_state.selected(), Some(1));

        app.model_picker_nav_up();
        assert_eq!(app.select_model().as_deref(), Some("gpt-4o"));
        assert_eq!(app.chat.model(), "gpt-4o");
        assert!(!app.show_model_picker);
    }

    #[test]
    fn empty_model_list_keeps_picker_closed() {
        let (mut app, _rx) = test_app();
        app.apply(BackendEvent::Models(Vec::new()));
        assert!(!app.show_model_picker);
        assert_eq!(app.select_model(), None);
    }

    #[test]
    fn completion_reply_clears_busy() {
        let (mut app, _rx) = test_app();
        app.completion.prompt.set("x");
        app.completion.submit();
        app.screen = Screen::Completions;
        assert!(app.is_busy());
        app.apply(BackendEvent::CompletionReply("done".to_string()));
        assert!(!app.is_busy());
        assert_eq!(app.completion.result(), Some("done"));
    }

    #[test]
    fn scroll_follows_long_transcripts() {
        let (mut app, _rx) = test_app();
        app.chat_height = 4;
        app.chat_width = 10;
        for i in 0..5 {
            app.chat.finish(Message::bot(&format!("reply {}", i)));
        }
        app.scroll_chat_to_bottom();
        // greeting wraps to 4 lines (6 with label and gap), each reply takes 3
        assert_eq!(app.chat_scroll, 6 + 5 * 3 - 4);
    }

    #[test]
    fn huge_reply_saturates_scroll() {
        let (mut app, _rx) = test_app();
        app.chat_height = 10;
        app.chat.finish(Message::bot(&"x\n".repeat(70_000)));
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, u16::MAX - 10);
    }

    #[test]
    fn animation_only_runs_for_the_busy_screen() {
        let (mut app, _rx) = test_app();
        app.completion.prompt.set("x");
        app.completion.submit();
        app.screen = Screen::Chat;
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
        app.screen = Screen::Completions;
        app.tick_animation();
        assert_eq!(app.animation_frame, 1);
    }

    #[tokio::test]
    async fn submit_is_refused_while_busy() {
        let (mut app, _rx) = test_app();
        app.chat.input.set("first");
        assert!(app.submit_chat());
        app.chat.input.set("second");
        assert!(!app.submit_chat());
        assert_eq!(app.chat.transcript().len(), 2);
    }
}
