use haru_core::{TokenPair, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use tracing::{debug, warn};

use super::{TokenStore, TokenStoreError};

const SERVICE: &str = "haru-cli";

/// Stores the pair in the OS keychain under fixed entry names, optionally
/// namespaced by a profile so several accounts can coexist.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
    profile: Option<String>,
}

impl KeyringTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: SERVICE.to_string(),
            profile: None,
        }
    }

    #[must_use]
    pub fn with_profile(profile: impl Into<String>) -> Self {
        Self {
            service: SERVICE.to_string(),
            profile: Some(profile.into()),
        }
    }

    fn entry_name(&self, key: &str) -> String {
        match self.profile.as_deref() {
            Some(profile) => format!("{profile}::{key}"),
            None => key.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<::keyring::Entry, TokenStoreError> {
        ::keyring::Entry::new(&self.service, &self.entry_name(key))
            .map_err(|err| TokenStoreError::Keyring(err.to_string()))
    }

    fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(::keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(TokenStoreError::Keyring(format!(
                "failed to load {key}: {err}"
            ))),
        }
    }
}

/// Named secret slots the token pair is written into.
trait EntrySlots {
    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError>;
    fn delete(&self, key: &str) -> Result<(), TokenStoreError>;
}

impl EntrySlots for KeyringTokenStore {
    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|err| TokenStoreError::Keyring(format!("failed to store {key}: {err}")))?;
        debug!(entry = %self.entry_name(key), "stored token in keyring");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), TokenStoreError> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(::keyring::Error::NoEntry) => Ok(()),
            Err(err) => {
                warn!(entry = %self.entry_name(key), "failed to delete token: {err}");
                Ok(())
            }
        }
    }
}

fn clear_pair(slots: &impl EntrySlots) -> Result<(), TokenStoreError> {
    slots.delete(ACCESS_TOKEN_KEY)?;
    slots.delete(REFRESH_TOKEN_KEY)
}

/// Writes both entries. If the second write fails both are removed, so a
/// stale access token never outlives the refresh token it belonged to.
fn write_pair(slots: &impl EntrySlots, tokens: &TokenPair) -> Result<(), TokenStoreError> {
    slots.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)?;
    if let Err(err) = slots.set(ACCESS_TOKEN_KEY, &tokens.access_token) {
        if let Err(rollback) = clear_pair(slots) {
            warn!(error = %rollback, "failed to roll back partial token write");
        }
        return Err(err);
    }
    Ok(())
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        self.get(REFRESH_TOKEN_KEY)
    }

    fn set_tokens(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        write_pair(self, tokens)
    }

    fn set_access_token(&self, access_token: &str) -> Result<(), TokenStoreError> {
        self.set(ACCESS_TOKEN_KEY, access_token)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        clear_pair(self)
    }
}
