use thiserror::Error;

/// Errors surfaced by the chat session.
///
/// `Validation`, `UnsupportedProvider` and `Transport` are the request
/// boundary failures shown to the user. The remaining variants reject an
/// action before it has any side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} integration coming soon!")]
    UnsupportedProvider(String),

    #[error("{0}")]
    Transport(String),

    #[error("chat is not configured")]
    NotConfigured,

    #[error("a request is already in flight")]
    RequestInFlight,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Transport(err.to_string())
    }
}
