use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    /// OS keychain.
    #[default]
    Keyring,
    /// `~/.haru/tokens.json`, owner-only.
    File,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub token_store: TokenStoreKind,
}
