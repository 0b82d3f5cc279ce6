use clap::{ArgAction, Parser, Subcommand};

pub use crate::modules::auth::args::*;
pub use crate::modules::learning::args::*;
pub use crate::modules::members::args::*;
pub use crate::modules::system::args::*;
use crate::modules::system::TokenStoreKind;

#[derive(Parser)]
#[command(name = "haru")]
#[command(about = "HaruHaru daily problem CLI")]
pub struct Cli {
    #[arg(long, env = "HARU_ADDR", help = "API base URL")]
    pub addr: Option<String>,
    #[arg(long, env = "HARU_TOKEN_STORE", value_enum, help = "Where tokens are kept")]
    pub token_store: Option<TokenStoreKind>,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(long, help = "Allow http:// and invalid TLS certificates")]
    pub insecure: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Config(ConfigArgs),
    Login(LoginArgs),
    Logout,
    Signup(SignupArgs),
    #[command(about = "Exchange the stored refresh token for a new pair")]
    Reissue,
    #[command(about = "Show the logged-in member")]
    Whoami,
    Profile(ProfileArgs),
    Device(DeviceArgs),
    #[command(about = "List categories, groups and topics")]
    Categories,
    #[command(about = "Show today's problem")]
    Today,
    Problem(ProblemArgs),
    #[command(about = "Show the problem assigned on each day of a month")]
    History(HistoryArgs),
    #[command(about = "Submit an answer to a daily problem")]
    Submit(AnswerArgs),
    #[command(about = "Replace the answer submitted today")]
    UpdateAnswer(AnswerArgs),
    #[command(about = "Show the current and longest streak")]
    Streak,
}

impl Command {
    /// Commands that run while signed out, or end the session themselves.
    pub fn manages_session(&self) -> bool {
        matches!(
            self,
            Self::Login(_) | Self::Logout | Self::Signup(_) | Self::Reissue
        )
    }
}
