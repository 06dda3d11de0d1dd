pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod exchange;
pub mod handler;
pub mod input;
pub mod logging;
pub mod session;
pub mod state;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use backend::BackendClient;
pub use config::{Config, Settings};
pub use error::ClientError;
pub use session::{ChatSession, ChatSubmission, CompletionSession};
pub use state::{CompletionParams, Message, Sender};
