//! UI-agnostic state types shared by the exchanges and the terminal front end.

use serde::{Deserialize, Serialize};

/// Who wrote a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub image: Option<String>,
}

impl Message {
    pub fn user(text: &str) -> Self {
        Self {
            sender: Sender::User,
            text: text.to_string(),
            image: None,
        }
    }

    pub fn bot(text: &str) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.to_string(),
            image: None,
        }
    }

    pub fn bot_image(text: &str, url: &str) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.to_string(),
            image: Some(url.to_string()),
        }
    }
}

pub const TEMPERATURE_MIN: f64 = 0.0;
pub const TEMPERATURE_MAX: f64 = 2.0;
pub const TEMPERATURE_STEP: f64 = 0.1;
pub const MAX_TOKENS_MIN: u32 = 1;
pub const MAX_TOKENS_MAX: u32 = 2048;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 100;

/// Sampling knobs of the completion form.
///
/// The ranges are enforced by the stepper methods used by the form widget.
/// Assigning the fields directly bypasses them, and the exchange sends
/// whatever is stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl CompletionParams {
    /// Move temperature by `steps` increments of 0.1, clamped to [0, 2].
    pub fn step_temperature(&mut self, steps: i32) {
        let next = self.temperature + f64::from(steps) * TEMPERATURE_STEP;
        // keep one decimal so repeated steps don't drift
        let rounded = (next * 10.0).round() / 10.0;
        self.temperature = rounded.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
    }

    /// Move max_tokens by `delta`, clamped to [1, 2048].
    pub fn step_max_tokens(&mut self, delta: i64) {
        let next = i64::from(self.max_tokens) + delta;
        self.max_tokens = next.clamp(i64::from(MAX_TOKENS_MIN), i64::from(MAX_TOKENS_MAX)) as u32;
    }

    pub fn in_range(&self) -> bool {
        (TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&self.temperature)
            && (MAX_TOKENS_MIN..=MAX_TOKENS_MAX).contains(&self.max_tokens)
    }
}
