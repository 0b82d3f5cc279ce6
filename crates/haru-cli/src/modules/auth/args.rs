use clap::{Args, ValueEnum};
use haru_core::Difficulty;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub login_id: String,
    #[arg(long, env = "HARU_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub login_id: String,
    #[arg(long, env = "HARU_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[arg(long)]
    pub nickname: String,
    #[arg(long, help = "Topic id from `haru categories`")]
    pub category_topic_id: i64,
    #[arg(long, value_enum)]
    pub difficulty: DifficultyArg,
}
