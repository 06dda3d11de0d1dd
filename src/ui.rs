use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use crate::app::{App, CompletionField, Health, InputMode, Screen};
use crate::input::TextInput;
use crate::state::{Sender, MAX_TOKENS_MAX, MAX_TOKENS_MIN, TEMPERATURE_MAX, TEMPERATURE_MIN};

const LOADING: &str = "Carregando";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Home => render_home_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Completions => render_completions_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.show_model_picker {
        render_model_picker(app, frame, area);
    }
}

fn loading_text(app: &App) -> String {
    // Animated ellipsis: cycles through ".", "..", "..."
    format!("{}{}", LOADING, ".".repeat((app.animation_frame as usize) + 1))
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        " Integration Hub ",
        Style::default().fg(Color::Cyan).bold(),
    )];

    for (i, screen) in Screen::all().iter().enumerate() {
        let style = if *screen == app.screen {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} {} ", i + 1, screen.title()), style));
    }

    let (health_label, health_color) = match app.health {
        Health::Unknown => ("backend: ?", Color::DarkGray),
        Health::Online => ("backend: ok", Color::Green),
        Health::Offline => ("backend: offline", Color::Red),
    };
    spans.push(Span::raw("  "));
    spans.push(Span::styled(health_label, Style::default().fg(health_color)));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        vec![
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    // the submit control is disabled while the current screen waits on the backend
    let send = if app.is_busy() { "wait" } else { "send" };

    let hints: Vec<Span> = match (app.screen, app.input_mode) {
        (Screen::Home, _) => [hint("Enter", "chat"), hint("1-3", "screen"), hint("q", "quit")].concat(),
        (Screen::Chat, InputMode::Normal) => [
            hint("i", "type"),
            hint("j/k", "scroll"),
            hint("M", "model"),
            hint("Tab", "screen"),
            hint("q", "quit"),
        ]
        .concat(),
        (Screen::Chat, InputMode::Editing) => [hint("Enter", send), hint("Esc", "stop typing")].concat(),
        (Screen::Completions, InputMode::Normal) => [
            hint("j/k", "field"),
            hint("+/-", "adjust"),
            hint("i", "edit prompt"),
            hint("s", send),
            hint("Tab", "screen"),
            hint("q", "quit"),
        ]
        .concat(),
        (Screen::Completions, InputMode::Editing) => {
            [hint("Enter", send), hint("Esc", "stop typing")].concat()
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_home_screen(app: &App, frame: &mut Frame, area: Rect) {
    let [_, card_area, _] = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(8),
        Constraint::Min(0),
    ])
    .areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = Text::from(vec![
        Line::from(Span::styled(
            "Bem-vindo ao OpenAI Integration Hub",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("Escolha uma funcionalidade no menu acima."),
        Line::default(),
        Line::from(Span::styled(
            app.base_url().to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let card = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(card, card_area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store area for mouse hit-testing and size for scroll calculations
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Chat: {} ", app.chat.model()));

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.chat.transcript() {
        let (label, color) = match msg.sender {
            Sender::User => ("Você:", Color::Cyan),
            Sender::Bot => ("Bot:", Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for line in msg.text.lines() {
            lines.push(Line::from(line.to_string()));
        }
        if let Some(url) = &msg.image {
            lines.push(Line::from(Span::styled(
                url.clone(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            )));
        }
        lines.push(Line::default());
    }

    if app.chat.is_busy() {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            loading_text(app),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing && !app.chat.is_busy() {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let title = if app.chat.is_busy() {
        " Aguarde a resposta... "
    } else {
        " Digite sua mensagem... "
    };
    render_text_input(frame, input_area, &app.chat.input, title, border_color, editing);
}

fn render_completions_screen(app: &App, frame: &mut Frame, area: Rect) {
    let [form_area, result_area] = Layout::vertical([
        Constraint::Length(6),
        Constraint::Min(0),
    ])
    .areas(area);

    let [prompt_area, params_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(form_area);

    let field = app.completion_field;
    let focus_color = |f: CompletionField| {
        if f == field { Color::Cyan } else { Color::DarkGray }
    };

    let editing = app.input_mode == InputMode::Editing;
    let prompt_color = if editing { Color::Yellow } else { focus_color(CompletionField::Prompt) };
    render_text_input(
        frame,
        prompt_area,
        &app.completion.prompt,
        " Digite o prompt... ",
        prompt_color,
        editing,
    );

    let [temp_area, tokens_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(params_area);

    let params = app.completion.params;
    let temperature = Paragraph::new(format!(" {:.1}", params.temperature)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(focus_color(CompletionField::Temperature)))
            .title(format!(" Temperature ({}-{}) ", TEMPERATURE_MIN, TEMPERATURE_MAX)),
    );
    frame.render_widget(temperature, temp_area);

    let tokens = Paragraph::new(format!(" {}", params.max_tokens)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(focus_color(CompletionField::MaxTokens)))
            .title(format!(" Max tokens ({}-{}) ", MAX_TOKENS_MIN, MAX_TOKENS_MAX)),
    );
    frame.render_widget(tokens, tokens_area);

    // Config values skip the steppers and are sent as they are
    let result_block = if params.in_range() {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Resultado ")
    } else {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Resultado (parâmetros fora do intervalo) ")
    };

    let result = if app.completion.is_busy() {
        Text::from(Span::styled(
            loading_text(app),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Text::from(app.completion.result().unwrap_or_default().to_string())
    };

    let result = Paragraph::new(result)
        .block(result_block)
        .wrap(Wrap { trim: false });
    frame.render_widget(result, result_area);
}

/// Bordered single-line input with horizontal scrolling around the cursor.
fn render_text_input(
    frame: &mut Frame,
    area: Rect,
    input: &TextInput,
    title: &str,
    border_color: Color,
    show_cursor: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = input.cursor();

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .value()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(paragraph, area);

    if show_cursor {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 40.min(area.width.saturating_sub(4));
    let popup_height = (app.available_models.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Select Model (Enter to select, Esc to cancel) ");

    let current = app.chat.model().to_string();
    let items: Vec<ListItem> = app
        .available_models
        .iter()
        .map(|model| {
            let style = if *model == current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", model)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.model_picker_state);
}
