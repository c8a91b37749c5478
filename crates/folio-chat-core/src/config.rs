use anyhow::Result;
use std::fmt;

use crate::provider::Provider;
use crate::storage::KeyValueStore;

pub const CREDENTIAL_KEY: &str = "llm_api_key";
pub const PROVIDER_KEY: &str = "llm_provider";

/// A saved provider selection and its credential.
///
/// Either both entries are in the store or neither is.
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    pub provider: Provider,
    pub credential: String,
}

impl Configuration {
    pub fn new(provider: Provider, credential: impl Into<String>) -> Self {
        Self {
            provider,
            credential: credential.into(),
        }
    }

    /// Reads the saved configuration. A missing entry, an empty credential,
    /// or an unknown provider name all count as "not configured".
    pub fn load(store: &impl KeyValueStore) -> Option<Self> {
        let credential = store.get(CREDENTIAL_KEY).filter(|c| !c.is_empty())?;
        let provider_name = store.get(PROVIDER_KEY)?;

        match Provider::from_str(&provider_name) {
            Some(provider) => Some(Self { provider, credential }),
            None => {
                tracing::warn!(provider = %provider_name, "ignoring saved configuration with unknown provider");
                None
            }
        }
    }

    /// Writes both entries. If the second write fails the credential entry is
    /// put back the way it was, so an earlier configuration survives intact.
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<()> {
        let previous_credential = store.get(CREDENTIAL_KEY);

        store.set(CREDENTIAL_KEY, &self.credential)?;
        if let Err(err) = store.set(PROVIDER_KEY, self.provider.as_str()) {
            let rollback = match previous_credential {
                Some(old) => store.set(CREDENTIAL_KEY, &old),
                None => store.remove(CREDENTIAL_KEY),
            };
            if let Err(rollback) = rollback {
                tracing::error!(error = %rollback, "failed to roll back partially saved credential");
            }
            return Err(err);
        }
        Ok(())
    }

    pub fn clear(store: &mut impl KeyValueStore) -> Result<()> {
        let credential = store.remove(CREDENTIAL_KEY);
        let provider = store.remove(PROVIDER_KEY);
        credential.and(provider)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("provider", &self.provider)
            .field("credential", &mask_credential(&self.credential))
            .finish()
    }
}

/// Masks a secret for display, keeping at most the last four characters.
pub fn mask_credential(credential: &str) -> String {
    let char_count = credential.chars().count();
    if char_count <= 4 {
        return "*".repeat(char_count);
    }

    let masked_len = char_count - 4;
    let last_four: String = credential.chars().skip(masked_len).collect();
    format!("{}...{}", "*".repeat(masked_len.min(20)), last_four)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct FailingProviderStore {
        inner: MemoryStore,
        armed: bool,
    }

    impl KeyValueStore for FailingProviderStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.armed && key == PROVIDER_KEY {
                anyhow::bail!("disk full");
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn load_needs_both_entries() {
        let mut store = MemoryStore::new();
        assert!(Configuration::load(&store).is_none());

        store.set(CREDENTIAL_KEY, "sk-test").unwrap();
        assert!(Configuration::load(&store).is_none());

        store.set(PROVIDER_KEY, "openai").unwrap();
        assert_eq!(
            Configuration::load(&store),
            Some(Configuration::new(Provider::OpenAI, "sk-test"))
        );
    }

    #[test]
    fn unknown_provider_is_treated_as_absent() {
        let mut store = MemoryStore::new();
        store.set(CREDENTIAL_KEY, "sk-test").unwrap();
        store.set(PROVIDER_KEY, "ollama").unwrap();
        assert!(Configuration::load(&store).is_none());
    }

    #[test]
    fn save_then_clear() {
        let mut store = MemoryStore::new();
        Configuration::new(Provider::Anthropic, "sk-ant").save(&mut store).unwrap();
        assert_eq!(store.get(PROVIDER_KEY).as_deref(), Some("anthropic"));

        Configuration::clear(&mut store).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn failed_save_leaves_nothing_behind() {
        let mut store = FailingProviderStore { armed: true, ..Default::default() };
        let result = Configuration::new(Provider::OpenAI, "sk-test").save(&mut store);

        assert!(result.is_err());
        assert!(store.inner.is_empty());
    }

    #[test]
    fn failed_resave_restores_the_earlier_configuration() {
        let mut store = FailingProviderStore::default();
        Configuration::new(Provider::Anthropic, "sk-old").save(&mut store).unwrap();

        store.armed = true;
        let result = Configuration::new(Provider::OpenAI, "sk-new").save(&mut store);

        assert!(result.is_err());
        assert_eq!(
            Configuration::load(&store),
            Some(Configuration::new(Provider::Anthropic, "sk-old"))
        );
    }

    #[test]
    fn debug_output_masks_the_credential() {
        let config = Configuration::new(Provider::OpenAI, "sk-secret-1234");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("1234"));
    }

    #[test]
    fn short_credentials_are_fully_masked() {
        assert_eq!(mask_credential(""), "");
        assert_eq!(mask_credential("abcd"), "****");
        assert_eq!(mask_credential("abcdef"), "**...cdef");
    }
}
