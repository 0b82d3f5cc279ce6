use clap::{Args, Subcommand};

use super::types::TokenStoreKind;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the stored CLI configuration")]
    Show,
    #[command(about = "Set the API base URL")]
    SetAddr(SetAddrArgs),
    #[command(about = "Set the per-request timeout in milliseconds")]
    SetTimeout(SetTimeoutArgs),
    #[command(about = "Choose where tokens are kept")]
    SetTokenStore(SetTokenStoreArgs),
}

#[derive(Args)]
pub struct SetAddrArgs {
    #[arg(help = "API base URL, e.g. https://api.haruharu.online")]
    pub addr: String,
}

#[derive(Args)]
pub struct SetTimeoutArgs {
    pub timeout_ms: u64,
}

#[derive(Args)]
pub struct SetTokenStoreArgs {
    #[arg(value_enum)]
    pub store: TokenStoreKind,
}
