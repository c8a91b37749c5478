use std::future::Future;
use std::pin::Pin;

use crate::error::ChatError;

pub mod openai;

pub use openai::OpenAIClient;

/// Instruction sent ahead of every user message.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// A single-turn completion: a system instruction and the latest user text.
/// Earlier turns of the conversation are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: user.into(),
        }
    }
}

/// A completions endpoint that turns one request into the assistant's reply.
pub trait CompletionBackend: Send + Sync {
    fn complete<'a>(
        &'a self,
        credential: &'a str,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, ChatError>> + Send + 'a>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}
