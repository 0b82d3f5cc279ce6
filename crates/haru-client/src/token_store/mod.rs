mod file;
mod keychain;
mod memory;

pub use self::file::FileTokenStore;
pub use self::keychain::KeyringTokenStore;
pub use self::memory::MemoryTokenStore;

use haru_core::TokenPair;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("failed to access keyring: {0}")]
    Keyring(String),
    #[error("token file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("token file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("token store lock poisoned")]
    Poisoned,
}

/// Synchronous persistence for the access/refresh pair.
///
/// The pair is written and cleared as a unit. A missing refresh token means
/// the session cannot be refreshed.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError>;
    fn refresh_token(&self) -> Result<Option<String>, TokenStoreError>;
    fn set_tokens(&self, tokens: &TokenPair) -> Result<(), TokenStoreError>;
    /// Replaces only the access token after a refresh that did not rotate
    /// the refresh token.
    fn set_access_token(&self, access_token: &str) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;

    fn has_session(&self) -> Result<bool, TokenStoreError> {
        Ok(self.access_token()?.is_some())
    }
}
