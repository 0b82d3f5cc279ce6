use chrono::{Datelike, NaiveDate};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ProblemArgs {
    #[command(subcommand)]
    pub command: ProblemCommand,
}

#[derive(Subcommand)]
pub enum ProblemCommand {
    #[command(about = "Show a daily problem with your answer and the AI answer")]
    Show(ProblemShowArgs),
    #[command(about = "Preview the problem assigned on a date (default: today)")]
    Preview(ProblemPreviewArgs),
}

#[derive(Args)]
pub struct ProblemShowArgs {
    pub id: i64,
}

#[derive(Args)]
pub struct ProblemPreviewArgs {
    #[arg(long, help = "Date as YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct AnswerArgs {
    #[arg(help = "Daily problem id")]
    pub id: i64,
    #[arg(long)]
    pub answer: String,
}

#[derive(Args)]
pub struct HistoryArgs {
    #[arg(long, value_parser = parse_month, help = "Month as YYYY-MM")]
    pub month: (i32, u32),
}

fn parse_month(raw: &str) -> Result<(i32, u32), String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM, got '{raw}'"))?;
    Ok((first.year(), first.month()))
}
