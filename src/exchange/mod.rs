pub mod reply;
pub mod routing;

use tracing::{info, warn};

use crate::backend::{BackendClient, CompletionRequest};
use crate::session::ChatSubmission;
use crate::state::Message;

/// Perform a chat submission and turn the result into the bot's transcript entry.
///
/// Never fails: every transport or decode error becomes the generic
/// connection message.
pub async fn run_chat(client: &BackendClient, submission: ChatSubmission) -> Message {
    match submission {
        ChatSubmission::Chat(request) => match client.chat(&request).await {
            Ok(body) => {
                info!(model = %request.model, "chat reply received");
                Message::bot(&reply::chat_reply_text(&body))
            }
            Err(e) => {
                warn!(error = %e, "chat exchange failed");
                Message::bot(reply::CONNECT_ERROR)
            }
        },
        ChatSubmission::Image(request) => match client.generate_image(&request).await {
            Ok(body) => match reply::image_url(&body) {
                Some(url) => {
                    info!(%url, "image generated");
                    Message::bot_image(reply::IMAGE_READY, &url)
                }
                None => Message::bot(reply::IMAGE_FAILED),
            },
            Err(e) => {
                warn!(error = %e, "image exchange failed");
                Message::bot(reply::CONNECT_ERROR)
            }
        },
    }
}

/// Perform a completion request and return the text to show in the result panel.
pub async fn run_completion(client: &BackendClient, request: CompletionRequest) -> String {
    match client.complete(&request).await {
        Ok(body) => reply::completion_reply_text(&body),
        Err(e) => {
            warn!(error = %e, "completion exchange failed");
            reply::CONNECT_ERROR.to_string()
        }
    }
}
