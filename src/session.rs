//! The two screens' exchange state machines.
//!
//! Both follow Idle -> Submitting -> Idle. `submit` performs the transition
//! into Submitting and hands back the request to send; `finish` records the
//! outcome and drops the busy flag whatever the outcome was. Neither tracks
//! how many requests are in flight: each `finish` appends in the order it is
//! called.

use crate::backend::{ChatRequest, CompletionRequest, ImageRequest};
use crate::exchange::routing::{self, Route};
use crate::input::TextInput;
use crate::state::{CompletionParams, Message};

pub const GREETING: &str = "Olá! Como posso ajudar você hoje?";

/// Request produced by a chat submission, already routed.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatSubmission {
    Chat(ChatRequest),
    Image(ImageRequest),
}

pub struct ChatSession {
    transcript: Vec<Message>,
    pub input: TextInput,
    busy: bool,
    model: String,
}

impl ChatSession {
    pub fn new(model: &str) -> Self {
        Self {
            transcript: vec![Message::bot(GREETING)],
            input: TextInput::default(),
            busy: false,
            model: model.to_string(),
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The submit control is enabled only while idle and with text typed.
    pub fn can_submit(&self) -> bool {
        !self.busy && !self.input.is_blank()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }

    /// Append the typed message, clear the field and mark the session busy.
    ///
    /// Returns `None` without touching anything when the input is blank.
    /// Being busy already does not block this; gating on busy is the
    /// caller's submit control.
    pub fn submit(&mut self) -> Option<ChatSubmission> {
        if self.input.is_blank() {
            return None;
        }

        let text = self.input.value().trim().to_string();
        self.transcript.push(Message::user(&text));
        self.input.clear();
        self.busy = true;

        let submission = match routing::route_for(&text) {
            Route::Chat => ChatSubmission::Chat(ChatRequest::single_turn(&text, &self.model)),
            Route::Image => ChatSubmission::Image(ImageRequest::new(&routing::image_prompt(&text))),
        };
        Some(submission)
    }

    pub fn finish(&mut self, reply: Message) {
        self.transcript.push(reply);
        self.busy = false;
    }
}

#[derive(Default)]
pub struct CompletionSession {
    pub prompt: TextInput,
    pub params: CompletionParams,
    result: Option<String>,
    busy: bool,
}

impl CompletionSession {
    pub fn new(params: CompletionParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_submit(&self) -> bool {
        !self.busy && !self.prompt.is_blank()
    }

    /// Clear the previous result and build the request from the current form.
    ///
    /// The parameters are sent as stored, without range checks.
    pub fn submit(&mut self) -> Option<CompletionRequest> {
        if self.prompt.is_blank() {
            return None;
        }

        self.result = None;
        self.busy = true;

        Some(CompletionRequest {
            prompt: self.prompt.value().to_string(),
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        })
    }

    pub fn finish(&mut self, text: String) {
        self.result = Some(text);
        self.busy = false;
    }
}
