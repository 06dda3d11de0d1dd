use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::warn;

use crate::app::{App, CompletionField, InputMode, Screen};
use crate::config::Config;
use crate::input::TextInput;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Backend(event) => app.apply(event),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_model_picker {
        handle_model_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => return app.switch_screen(Screen::Home),
        KeyCode::Char('2') => return app.switch_screen(Screen::Chat),
        KeyCode::Char('3') => return app.switch_screen(Screen::Completions),
        KeyCode::Tab => return app.switch_screen(app.screen.next()),
        KeyCode::BackTab => return app.switch_screen(app.screen.prev()),
        _ => {}
    }

    match app.screen {
        Screen::Home => {
            if key.code == KeyCode::Enter {
                app.switch_screen(Screen::Chat);
            }
        }
        Screen::Chat => handle_chat_normal(app, key),
        Screen::Completions => handle_completions_normal(app, key),
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down(app.chat_height / 2)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up(app.chat_height / 2)
        }
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('M') => app.request_models(),
        _ => {}
    }
}

fn handle_completions_normal(app: &mut App, key: KeyEvent) {
    let field = app.completion_field;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.completion_field = field.next(),
        KeyCode::Char('k') | KeyCode::Up => app.completion_field = field.prev(),
        KeyCode::Char('i') | KeyCode::Enter if field == CompletionField::Prompt => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('s') => {
            app.submit_completion();
        }
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => step_field(app, field, 1),
        KeyCode::Char('-') | KeyCode::Left => step_field(app, field, -1),
        KeyCode::PageUp => step_field(app, field, 10),
        KeyCode::PageDown => step_field(app, field, -10),
        _ => {}
    }
}

/// Numeric steppers: clamped to the widget ranges.
fn step_field(app: &mut App, field: CompletionField, steps: i32) {
    match field {
        CompletionField::Prompt => {}
        CompletionField::Temperature => app.completion.params.step_temperature(steps),
        CompletionField::MaxTokens => app.completion.params.step_max_tokens(i64::from(steps)),
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    match app.screen {
        Screen::Chat => {
            if key.code == KeyCode::Enter {
                app.submit_chat();
            } else {
                edit_text(&mut app.chat.input, key);
            }
        }
        Screen::Completions => {
            if key.code == KeyCode::Enter {
                if app.submit_completion() {
                    app.input_mode = InputMode::Normal;
                }
            } else {
                edit_text(&mut app.completion.prompt, key);
            }
        }
        Screen::Home => app.input_mode = InputMode::Normal,
    }
}

fn edit_text(input: &mut TextInput, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

fn handle_model_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.show_model_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.model_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.model_picker_nav_up(),
        KeyCode::Enter => {
            if let Some(model) = app.select_model() {
                if let Err(e) = Config::save_chat_model(&model) {
                    warn!(error = %e, "could not persist chat model");
                }
            }
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != Screen::Chat {
        return;
    }
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(3),
        MouseEventKind::ScrollUp => app.scroll_chat_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::BackendEvent;
    use crate::state::{Message, Sender};
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        // nothing listens on the discard port, so any request fails fast
        let settings = Config {
            base_url: Some("http://127.0.0.1:9".to_string()),
            ..Config::new()
        }
        .resolve_with(|_| None);
        (App::new(&settings, tx), rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn number_keys_switch_screens() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.screen, Screen::Completions);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Home);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Chat);
    }

    #[test]
    fn ctrl_c_quits_while_editing() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('i'));
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn q_is_text_while_editing() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "qual");
        assert!(!app.should_quit);
        assert_eq!(app.chat.input.value(), "qual");
    }

    #[test]
    fn enter_on_blank_chat_input_does_nothing() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.chat.transcript().len(), 1);
        assert!(!app.chat.is_busy());
    }

    #[tokio::test]
    async fn failed_chat_exchange_reports_connect_error() {
        let (mut app, mut rx) = test_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "Oi");
        press(&mut app, KeyCode::Enter);

        assert!(app.chat.is_busy());
        assert_eq!(app.chat.transcript()[1], Message::user("Oi"));

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event);

        assert!(!app.chat.is_busy());
        let last = app.chat.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, crate::exchange::reply::CONNECT_ERROR);
    }

    #[test]
    fn steppers_adjust_focused_field() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.completion_field, CompletionField::Temperature);
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.completion.params.temperature, 0.8);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.completion.params.max_tokens, 90);
        for _ in 0..300 {
            press(&mut app, KeyCode::PageUp);
        }
        assert_eq!(app.completion.params.max_tokens, 2048);
    }

    #[tokio::test]
    async fn completion_enter_submits_and_leaves_editing() {
        let (mut app, mut rx) = test_app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Editing);
        type_text(&mut app, "Era uma vez");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.completion.is_busy());

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            AppEvent::Backend(BackendEvent::CompletionReply(_))
        ));
        handle_event(&mut app, event);
        assert!(!app.completion.is_busy());
        assert_eq!(
            app.completion.result(),
            Some(crate::exchange::reply::CONNECT_ERROR)
        );
    }

    #[test]
    fn model_picker_captures_keys() {
        let (mut app, _rx) = test_app();
        app.apply(BackendEvent::Models(vec!["a".to_string(), "b".to_string()]));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert!(!app.show_model_picker);
    }
}
