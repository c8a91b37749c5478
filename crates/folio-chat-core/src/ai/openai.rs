use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionBackend, CompletionRequest};
use crate::error::ChatError;

pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const MAX_OUTPUT_TOKENS: u32 = 500;

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    max_tokens: u32,
}

impl<'a> OpenAIRequest<'a> {
    fn from_completion(request: &'a CompletionRequest) -> Self {
        Self {
            model: OPENAI_MODEL,
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: &request.system,
                },
                OpenAIMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone, Debug)]
pub struct OpenAIClient {
    client: Client,
    endpoint: String,
}

impl Default for OpenAIClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAIClient {
    pub fn new() -> Self {
        Self::with_endpoint(OPENAI_CHAT_COMPLETIONS_URL)
    }

    /// Points the client at another chat-completions URL (a proxy, or a
    /// local server in tests).
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn query(&self, api_key: &str, request: &CompletionRequest) -> Result<String, ChatError> {
        let body = OpenAIRequest::from_completion(request);

        let response = self.client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "chat completion rejected");
            return Err(ChatError::Transport(format!("API Error: {}", status)));
        }

        let openai_response: OpenAIResponse = response.json().await?;
        openai_response.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::Transport("API Error: response contained no choices".to_string()))
    }
}

impl CompletionBackend for OpenAIClient {
    fn complete<'a>(
        &'a self,
        credential: &'a str,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, ChatError>> + Send + 'a>> {
        Box::pin(self.query(credential, request))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
