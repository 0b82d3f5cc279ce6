use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use haru_client::config::{BASE_URL_ENV, TIMEOUT_ENV};
use haru_client::{ClientConfig, FileTokenStore, KeyringTokenStore, TokenStore};
use tracing::debug;

use super::args::{ConfigArgs, ConfigCommand};
use super::output::{print_done, print_json};
use super::types::{CliConfig, TokenStoreKind};

pub(crate) fn handle_config_command(
    args: ConfigArgs,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => print_json(config)?,
        ConfigCommand::SetAddr(args) => {
            let addr = args.addr.trim().trim_end_matches('/').to_string();
            ClientConfig::new(&addr)?;
            config.addr = Some(addr);
            print_done("API address updated");
        }
        ConfigCommand::SetTimeout(args) => {
            if args.timeout_ms == 0 {
                anyhow::bail!("timeout must be greater than zero");
            }
            config.timeout_ms = Some(args.timeout_ms);
            print_done("Timeout updated");
        }
        ConfigCommand::SetTokenStore(args) => {
            config.token_store = args.store;
            print_done("Token store updated");
        }
    }
    Ok(())
}

fn haru_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home).join(".haru"))
}

fn config_path() -> anyhow::Result<PathBuf> {
    Ok(haru_dir()?.join("config.json"))
}

fn tokens_path() -> anyhow::Result<PathBuf> {
    Ok(haru_dir()?.join("tokens.json"))
}

pub(crate) fn load_config() -> anyhow::Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(config)
}

pub(crate) fn save_config(config: &CliConfig) -> anyhow::Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

pub(crate) fn open_token_store(kind: TokenStoreKind) -> anyhow::Result<Arc<dyn TokenStore>> {
    let store: Arc<dyn TokenStore> = match kind {
        TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new()),
        TokenStoreKind::File => Arc::new(FileTokenStore::new(tokens_path()?)),
    };
    debug!(store = ?kind, "opened token store");
    Ok(store)
}

/// `--addr` wins, then `HARU_API_BASE_URL`, then the saved address. The
/// timeout follows the same order without a flag.
pub(crate) fn resolve_client_config(
    addr_arg: Option<&str>,
    allow_insecure: bool,
    config: &CliConfig,
) -> anyhow::Result<ClientConfig> {
    let mut resolved = ClientConfig::from_env()?;
    let saved_addr = if std::env::var_os(BASE_URL_ENV).is_some() {
        None
    } else {
        config.addr.as_deref()
    };
    if let Some(addr) = addr_arg.or(saved_addr) {
        resolved.base_url = ClientConfig::new(addr)?.base_url;
    }
    if std::env::var_os(TIMEOUT_ENV).is_none() {
        if let Some(timeout_ms) = config.timeout_ms {
            resolved = resolved.with_timeout(Duration::from_millis(timeout_ms));
        }
    }
    Ok(resolved.allow_insecure(allow_insecure))
}
