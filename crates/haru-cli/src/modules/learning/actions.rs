use haru_client::modules::{categories, problems, streaks, submissions};
use haru_client::ApiClient;

use super::args::{AnswerArgs, HistoryArgs, ProblemArgs, ProblemCommand};
use crate::modules::system::print_json;

pub(crate) async fn handle_categories(client: &ApiClient) -> anyhow::Result<()> {
    let list = categories::list_categories(client).await?;
    print_json(&list)
}

pub(crate) async fn handle_today(client: &ApiClient) -> anyhow::Result<()> {
    let problem = problems::today_problem(client).await?;
    print_json(&problem)
}

pub(crate) async fn handle_problem(args: ProblemArgs, client: &ApiClient) -> anyhow::Result<()> {
    match args.command {
        ProblemCommand::Show(args) => {
            let detail = problems::problem_detail(client, args.id).await?;
            print_json(&detail)
        }
        ProblemCommand::Preview(args) => {
            let problem = problems::daily_problem(client, args.date).await?;
            print_json(&problem)
        }
    }
}

pub(crate) async fn handle_history(args: HistoryArgs, client: &ApiClient) -> anyhow::Result<()> {
    let (year, month) = args.month;
    let history = problems::monthly_history(client, year, month).await?;
    print_json(&history)
}

pub(crate) async fn handle_submit(args: AnswerArgs, client: &ApiClient) -> anyhow::Result<()> {
    let answer = non_empty_answer(&args.answer)?;
    let submission = submissions::submit_answer(client, args.id, answer).await?;
    print_json(&submission)
}

pub(crate) async fn handle_update_answer(
    args: AnswerArgs,
    client: &ApiClient,
) -> anyhow::Result<()> {
    let answer = non_empty_answer(&args.answer)?;
    let submission = submissions::update_answer(client, args.id, answer).await?;
    print_json(&submission)
}

pub(crate) async fn handle_streak(client: &ApiClient) -> anyhow::Result<()> {
    let streak = streaks::get_streak(client).await?;
    print_json(&streak)
}

fn non_empty_answer(answer: &str) -> anyhow::Result<&str> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        anyhow::bail!("answer must not be empty");
    }
    Ok(trimmed)
}
