//! The chat session manager: configuration, conversation and the request
//! lifecycle for one chat panel.
//!
//! A session is only ever driven from one event loop. The network call is
//! split out into [`OutboundRequest::send`] so a front end can run it on a
//! background task and hand the [`Reply`] back to [`ChatSession::complete`].

use std::fmt;

use crate::ai::{CompletionBackend, CompletionRequest};
use crate::config::{mask_credential, Configuration};
use crate::error::ChatError;
use crate::provider::Provider;
use crate::state::{ChatMessage, ChatRole, MessageIds, SessionState};
use crate::storage::KeyValueStore;

pub const MISSING_CREDENTIAL: &str = "Please enter your API key";
pub const EMPTY_MESSAGE: &str = "Message is empty";

pub fn welcome_message(provider: Provider) -> String {
    format!(
        "Hello! I'm ready to chat using your {} API. How can I help you today?",
        provider.vendor_name()
    )
}

pub fn error_message(err: &ChatError) -> String {
    format!("Sorry, I encountered an error: {}", err)
}

pub struct ChatSession<S: KeyValueStore> {
    store: S,

    // Configuration form
    provider: Provider,
    credential: String,

    // Conversation
    input: String,
    messages: Vec<ChatMessage>,
    ids: MessageIds,

    configured: bool,
    // Set while a request is outstanding, even across a clear, until its reply arrives
    pending_request: bool,
    last_error: Option<String>,

    // Bumped whenever the conversation is reset so stale replies can be dropped
    epoch: u64,
}

/// Everything needed to make one completion call, detached from the session.
pub struct OutboundRequest {
    provider: Provider,
    credential: String,
    completion: CompletionRequest,
    epoch: u64,
}

/// The outcome of an [`OutboundRequest`], ready to be applied to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    epoch: u64,
    pub result: Result<String, ChatError>,
}

impl<S: KeyValueStore> ChatSession<S> {
    /// Creates the session, picking up a previously saved configuration.
    pub fn mount(store: S) -> Self {
        let saved = Configuration::load(&store);
        if let Some(config) = &saved {
            tracing::info!(provider = config.provider.as_str(), "restored saved chat configuration");
        }

        let (configured, provider, credential) = match saved {
            Some(config) => (true, config.provider, config.credential),
            None => (false, Provider::default(), String::new()),
        };

        Self {
            store,
            provider,
            credential,
            input: String::new(),
            messages: Vec::new(),
            ids: MessageIds::default(),
            configured,
            pending_request: false,
            last_error: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        if !self.configured {
            SessionState::Unconfigured
        } else if self.pending_request {
            SessionState::Awaiting
        } else if self.last_error.is_some() {
            SessionState::Error
        } else {
            SessionState::Idle
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn is_pending(&self) -> bool {
        self.pending_request
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Changes the provider selection. Only possible before configuring.
    pub fn set_provider(&mut self, provider: Provider) -> bool {
        if self.configured {
            return false;
        }
        self.provider = provider;
        true
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn credential_mut(&mut self) -> &mut String {
        &mut self.credential
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// Whether a submit would currently be accepted.
    pub fn can_submit(&self) -> bool {
        self.configured && !self.pending_request && !self.input.trim().is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and persists the provider and credential from the form, then
    /// opens the conversation with a welcome message.
    pub fn save_configuration(&mut self) -> Result<(), ChatError> {
        if self.configured && self.pending_request {
            return Err(ChatError::RequestInFlight);
        }

        if self.credential.trim().is_empty() {
            self.last_error = Some(MISSING_CREDENTIAL.to_string());
            return Err(ChatError::Validation(MISSING_CREDENTIAL.to_string()));
        }

        let config = Configuration::new(self.provider, self.credential.clone());
        if let Err(err) = config.save(&mut self.store) {
            tracing::error!(error = %err, "failed to save chat configuration");
            if let Some(saved) = Configuration::load(&self.store).filter(|_| self.configured) {
                self.provider = saved.provider;
                self.credential = saved.credential;
            }
            let err = ChatError::Storage(err.to_string());
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        tracing::info!(provider = self.provider.as_str(), "chat configured");

        self.configured = true;
        self.last_error = None;
        self.epoch += 1;
        self.messages.clear();
        let welcome = ChatMessage::new(&mut self.ids, ChatRole::Assistant, welcome_message(self.provider));
        self.messages.push(welcome);
        Ok(())
    }

    /// Forgets the saved configuration and the conversation.
    ///
    /// A request already in flight keeps the submit gate closed until its
    /// reply arrives; that reply is then dropped.
    pub fn clear_configuration(&mut self) -> Result<(), ChatError> {
        let removed = Configuration::clear(&mut self.store);

        self.provider = Provider::default();
        self.credential.clear();
        self.input.clear();
        self.messages.clear();
        self.configured = false;
        self.last_error = None;
        self.epoch += 1;

        match removed {
            Ok(()) => {
                tracing::info!("chat configuration cleared");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to remove saved chat configuration");
                let err = ChatError::Storage(err.to_string());
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Takes the draft as a user message and returns the request to send.
    ///
    /// Rejections leave the session untouched.
    pub fn begin_submit(&mut self) -> Result<OutboundRequest, ChatError> {
        if !self.configured {
            return Err(ChatError::NotConfigured);
        }
        if self.pending_request {
            return Err(ChatError::RequestInFlight);
        }
        if self.input.trim().is_empty() {
            return Err(ChatError::Validation(EMPTY_MESSAGE.to_string()));
        }

        let text = std::mem::take(&mut self.input);
        let message = ChatMessage::new(&mut self.ids, ChatRole::User, text.clone());
        tracing::debug!(id = message.id, provider = self.provider.as_str(), "submitting chat message");
        self.messages.push(message);

        self.pending_request = true;
        self.last_error = None;

        Ok(OutboundRequest {
            provider: self.provider,
            credential: self.credential.clone(),
            completion: CompletionRequest::new(text),
            epoch: self.epoch,
        })
    }

    /// Records the outcome of a request. Returns `false` if the reply belongs
    /// to a conversation that has since been reset; it still reopens the
    /// submit gate.
    pub fn complete(&mut self, reply: Reply) -> bool {
        if !self.pending_request {
            tracing::debug!("ignoring reply with no request in flight");
            return false;
        }

        self.pending_request = false;
        if reply.epoch != self.epoch {
            tracing::debug!("discarding reply for a reset conversation");
            return false;
        }

        match reply.result {
            Ok(content) => {
                self.last_error = None;
                let message = ChatMessage::new(&mut self.ids, ChatRole::Assistant, content);
                self.messages.push(message);
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                self.last_error = Some(err.to_string());
                let message = ChatMessage::new(&mut self.ids, ChatRole::Assistant, error_message(&err));
                self.messages.push(message);
            }
        }
        true
    }

    /// Submits the draft and waits for the reply in one step.
    ///
    /// Rejections return early with no change. A failed request is recorded
    /// in the conversation and then returned as well.
    pub async fn submit<B>(&mut self, backend: &B) -> Result<(), ChatError>
    where
        B: CompletionBackend + ?Sized,
    {
        let request = self.begin_submit()?;
        let reply = request.send(backend).await;
        let outcome = reply.result.clone().map(|_| ());
        self.complete(reply);
        outcome
    }
}

impl OutboundRequest {
    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn completion(&self) -> &CompletionRequest {
        &self.completion
    }

    /// Performs the call. Unsupported providers fail here without any
    /// network traffic.
    pub async fn send<B>(self, backend: &B) -> Reply
    where
        B: CompletionBackend + ?Sized,
    {
        let result = if self.provider.is_supported() {
            tracing::debug!(backend = backend.name(), "sending chat completion");
            backend.complete(&self.credential, &self.completion).await
        } else {
            Err(ChatError::UnsupportedProvider(self.provider.vendor_name().to_string()))
        };

        Reply {
            epoch: self.epoch,
            result,
        }
    }
}

impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("provider", &self.provider)
            .field("credential", &mask_credential(&self.credential))
            .field("completion", &self.completion)
            .field("epoch", &self.epoch)
            .finish()
    }
}
