use std::sync::Mutex;

use haru_core::TokenPair;

use super::{TokenStore, TokenStoreError};

#[derive(Debug, Default)]
struct Slots {
    access: Option<String>,
    refresh: Option<String>,
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slots: Mutex<Slots>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tokens(tokens: &TokenPair) -> Self {
        Self {
            slots: Mutex::new(Slots {
                access: Some(tokens.access_token.clone()),
                refresh: Some(tokens.refresh_token.clone()),
            }),
        }
    }

    fn with_slots<T>(&self, f: impl FnOnce(&mut Slots) -> T) -> Result<T, TokenStoreError> {
        let mut slots = self.slots.lock().map_err(|_| TokenStoreError::Poisoned)?;
        Ok(f(&mut slots))
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        self.with_slots(|slots| slots.access.clone())
    }

    fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        self.with_slots(|slots| slots.refresh.clone())
    }

    fn set_tokens(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        self.with_slots(|slots| {
            slots.access = Some(tokens.access_token.clone());
            slots.refresh = Some(tokens.refresh_token.clone());
        })
    }

    fn set_access_token(&self, access_token: &str) -> Result<(), TokenStoreError> {
        self.with_slots(|slots| slots.access = Some(access_token.to_string()))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        self.with_slots(|slots| *slots = Slots::default())
    }
}
