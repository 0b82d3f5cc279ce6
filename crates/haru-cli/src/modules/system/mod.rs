pub(crate) mod args;
pub(crate) mod config;
mod output;
pub(crate) mod types;

pub(crate) use config::{
    handle_config_command, load_config, open_token_store, resolve_client_config, save_config,
};
pub(crate) use output::{print_done, print_json};
pub(crate) use types::TokenStoreKind;
