use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use haru_core::TokenPair;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TokenStore, TokenStoreError};

#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// JSON file holding both tokens, readable only by the owner on Unix.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read(&self) -> Result<StoredTokens, TokenStoreError> {
        if !self.path.exists() {
            return Ok(StoredTokens::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?;
        if contents.trim().is_empty() {
            return Ok(StoredTokens::default());
        }
        serde_json::from_str(&contents).map_err(|source| TokenStoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn write(&self, tokens: &StoredTokens) -> Result<(), TokenStoreError> {
        if tokens.access_token.is_none() && tokens.refresh_token.is_none() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(self.io_error(err)),
            };
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let contents = serde_json::to_vec_pretty(tokens).map_err(|source| {
            TokenStoreError::Corrupt {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = open_private(&tmp).map_err(|err| self.io_error(err))?;
        file.write_all(&contents).map_err(|err| self.io_error(err))?;
        file.sync_all().map_err(|err| self.io_error(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))?;
        debug!(path = %self.path.display(), "stored tokens in file");
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut StoredTokens)) -> Result<(), TokenStoreError> {
        let _guard = self.lock.lock().map_err(|_| TokenStoreError::Poisoned)?;
        let mut tokens = self.read()?;
        f(&mut tokens);
        self.write(&tokens)
    }

    fn load(&self) -> Result<StoredTokens, TokenStoreError> {
        let _guard = self.lock.lock().map_err(|_| TokenStoreError::Poisoned)?;
        self.read()
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.load()?.access_token)
    }

    fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.load()?.refresh_token)
    }

    fn set_tokens(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        self.update(|stored| {
            stored.access_token = Some(tokens.access_token.clone());
            stored.refresh_token = Some(tokens.refresh_token.clone());
        })
    }

    fn set_access_token(&self, access_token: &str) -> Result<(), TokenStoreError> {
        self.update(|stored| stored.access_token = Some(access_token.to_string()))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        self.update(|stored| *stored = StoredTokens::default())
    }
}
