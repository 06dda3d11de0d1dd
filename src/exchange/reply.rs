//! Turning decoded response bodies into the text shown to the user.
//!
//! The backend's response shape is not validated; each screen reads a fixed,
//! ordered list of fields and takes the first one that carries something.

use serde_json::Value;

/// Fields read from a `/chat` body, in priority order.
pub const CHAT_REPLY_FIELDS: &[&str] = &["response", "message"];

/// Fields read from a `/completions` body, in priority order.
pub const COMPLETION_REPLY_FIELDS: &[&str] = &["response", "message", "completion", "result"];

pub const CHAT_EMPTY_REPLY: &str = "Erro na resposta.";
pub const COMPLETION_EMPTY_REPLY: &str = "Sem resposta.";
pub const CONNECT_ERROR: &str = "Erro ao conectar ao backend.";
pub const IMAGE_FAILED: &str = "Não foi possível gerar a imagem.";
pub const IMAGE_READY: &str = "Imagem gerada:";

/// First field in `fields` holding a displayable value.
pub fn first_text_field(body: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| body.get(field).and_then(displayable))
}

fn displayable(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        _ => None,
    }
}

/// Pretty dump of a body that has content but none of the known fields.
fn raw_dump(body: &Value) -> Option<String> {
    let empty = match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if empty {
        None
    } else {
        serde_json::to_string_pretty(body).ok()
    }
}

pub fn chat_reply_text(body: &Value) -> String {
    first_text_field(body, CHAT_REPLY_FIELDS)
        .or_else(|| raw_dump(body))
        .unwrap_or_else(|| CHAT_EMPTY_REPLY.to_string())
}

pub fn completion_reply_text(body: &Value) -> String {
    first_text_field(body, COMPLETION_REPLY_FIELDS)
        .unwrap_or_else(|| COMPLETION_EMPTY_REPLY.to_string())
}

/// `urls[0]` of an `/image` body, when it is a non-empty string.
pub fn image_url(body: &Value) -> Option<String> {
    body.get("urls")
        .and_then(|urls| urls.get(0))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}
