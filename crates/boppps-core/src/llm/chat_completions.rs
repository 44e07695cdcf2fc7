//! OpenAI-compatible chat-completion client.
//!
//! Works against any service exposing `POST <base_url>/chat/completions`
//! (Groq, OpenAI, local gateways). One user message per request.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::client::CompletionClient;
use super::types::{CompletionError, CompletionRequest};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for the chat-completion API.
pub struct ChatCompletionsClient {
    http_client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl ChatCompletionsClient {
    /// Create a client for `base_url` (without the trailing
    /// `/chat/completions`).
    ///
    /// A missing or empty key is accepted here; the remote service rejects
    /// the first request instead.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &request.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };

        let mut builder = self.http_client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        tracing::debug!(model = %request.model, endpoint = %self.endpoint(), "sending completion request");
        let response = builder.send().await.map_err(CompletionError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let text = response.text().await.map_err(CompletionError::Transport)?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}
