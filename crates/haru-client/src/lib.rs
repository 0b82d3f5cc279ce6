#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod http;
pub mod modules;
pub mod session;
pub mod token_store;

pub use crate::config::{ClientConfig, ConfigError};
pub use crate::http::{ApiClient, ApiRequest, RefreshError};
pub use crate::session::{SessionBroadcast, SessionEvent, SessionSubscription};
pub use crate::token_store::{
    FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TokenStoreError,
};
pub use haru_core::{ApiError, ErrorKind, TokenPair};
