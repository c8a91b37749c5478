use serde::{Deserialize, Serialize};

/// The completions vendor selected in the configuration form.
///
/// Only `OpenAI` is wired to a live endpoint; `Anthropic` is offered in the
/// picker but every request made with it fails locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::OpenAI, Provider::Anthropic]
    }

    /// Short vendor name used in chat copy ("your OpenAI API").
    pub fn vendor_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI (GPT)",
            Provider::Anthropic => "Anthropic (Claude) - coming soon",
        }
    }

    /// Whether requests for this provider reach a network endpoint.
    pub fn is_supported(&self) -> bool {
        matches!(self, Provider::OpenAI)
    }

    /// The provider after this one in picker order, wrapping around.
    pub fn next(&self) -> Provider {
        match self {
            Provider::OpenAI => Provider::Anthropic,
            Provider::Anthropic => Provider::OpenAI,
        }
    }
}
