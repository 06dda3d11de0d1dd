use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClientError;

pub const IMAGE_COUNT: u32 = 1;
pub const IMAGE_SIZE: &str = "512x512";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
    pub model: String,
}

impl ChatRequest {
    /// The chat screen never sends history, only the message just typed.
    pub fn single_turn(content: &str, model: &str) -> Self {
        Self {
            messages: vec![ChatTurn {
                role: "user".to_string(),
                content: content.to_string(),
            }],
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

impl ImageRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            n: IMAGE_COUNT,
            size: IMAGE_SIZE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Deserialize)]
struct ModelsResponse {
    models: Vec<String>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// Typed client for the hub backend.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl BackendClient {
    pub fn new(base_url: &str, api_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<Value, ClientError> {
        self.post_json("/chat", request).await
    }

    pub async fn generate_image(&self, request: &ImageRequest) -> Result<Value, ClientError> {
        self.post_json("/image", request).await
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<Value, ClientError> {
        self.post_json("/completions", request).await
    }

    pub async fn list_models(&self) -> Result<Vec<String>, ClientError> {
        let body = self.get_json("/models").await?;
        let models: ModelsResponse = serde_json::from_value(body)?;
        Ok(models.models)
    }

    /// True when the backend answers `/health` with `status: "ok"`.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let body = self.get_json("/health").await?;
        let health: HealthResponse = serde_json::from_value(body)?;
        Ok(health.status == "ok")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ClientError> {
        let url = self.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        Self::decode(&url, response).await
    }

    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let url = self.endpoint(path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await?;

        Self::decode(&url, response).await
    }

    async fn decode(url: &str, response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "backend rejected request");
            return Err(ClientError::Status(status));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_is_a_single_user_turn() {
        let request = ChatRequest::single_turn("Oi", "gpt-3.5-turbo");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "messages": [{ "role": "user", "content": "Oi" }],
                "model": "gpt-3.5-turbo"
            })
        );
    }

    #[test]
    fn image_request_uses_fixed_generation_parameters() {
        let body = serde_json::to_value(ImageRequest::new("um gato")).unwrap();
        assert_eq!(body, json!({ "prompt": "um gato", "n": 1, "size": "512x512" }));
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = BackendClient::new("http://localhost:8000/", "t");
        assert_eq!(client.endpoint("/chat"), "http://localhost:8000/chat");
    }
}
