use crate::error::{GenerationError, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;

/// Key the API credential is stored under.
pub const CREDENTIAL_KEY: &str = "openai_api_key";

/// Bearer secret for the generation endpoints. Read once at startup and
/// never refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

/// An already-populated key-value store holding the credential.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment; `openai_api_key` is looked up as
/// `OPENAI_API_KEY`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialStore;

impl CredentialStore for EnvCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key.to_uppercase()).ok()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryCredentialStore {
    entries: HashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

pub fn load_credential(store: &dyn CredentialStore) -> Result<Credential> {
    match store.get(CREDENTIAL_KEY) {
        Some(secret) if !secret.trim().is_empty() => {
            log::debug!("Credential found under '{}'", CREDENTIAL_KEY);
            Ok(Credential::new(secret.trim()))
        }
        _ => Err(GenerationError::MissingCredential(format!(
            "no value stored under '{}'",
            CREDENTIAL_KEY
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_load_from_memory_store() {
        let store = MemoryCredentialStore::new().with_entry(CREDENTIAL_KEY, "sk-test");
        let credential = load_credential(&store).unwrap();
        assert_eq!(credential.expose(), "sk-test");
        assert_eq!(credential.bearer(), "Bearer sk-test");
    }

    #[test]
    fn test_missing_or_blank_credential() {
        let err = load_credential(&MemoryCredentialStore::new()).unwrap_err();
        assert!(matches!(err, GenerationError::MissingCredential(_)));

        let blank = MemoryCredentialStore::new().with_entry(CREDENTIAL_KEY, "   ");
        assert!(matches!(
            load_credential(&blank),
            Err(GenerationError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let credential = Credential::new("sk-very-secret");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }

    #[test]
    #[serial]
    fn test_env_store_uppercases_key() {
        env::set_var("OPENAI_API_KEY", "sk-from-env");
        assert_eq!(
            EnvCredentialStore.get(CREDENTIAL_KEY).as_deref(),
            Some("sk-from-env")
        );
        env::remove_var("OPENAI_API_KEY");
        assert!(load_credential(&EnvCredentialStore).is_err());
    }
}
