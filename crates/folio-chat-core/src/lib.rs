pub mod ai;
pub mod config;
pub mod error;
pub mod provider;
pub mod session;
pub mod state;
pub mod storage;

// Re-export main types for convenience
pub use ai::{CompletionBackend, CompletionRequest, OpenAIClient};
pub use config::{mask_credential, Configuration};
pub use error::ChatError;
pub use provider::Provider;
pub use session::{ChatSession, OutboundRequest, Reply};
pub use state::{ChatMessage, ChatRole, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
