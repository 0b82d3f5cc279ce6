use haru_client::ApiClient;

use crate::cli_args::*;
use crate::modules::auth::{handle_login, handle_logout, handle_reissue, handle_signup};
use crate::modules::learning::{
    handle_categories, handle_history, handle_problem, handle_streak, handle_submit, handle_today,
    handle_update_answer,
};
use crate::modules::members::{handle_device, handle_profile, handle_whoami};

pub(crate) async fn handle_command(command: Command, client: &ApiClient) -> anyhow::Result<()> {
    match command {
        Command::Login(args) => handle_login(args, client).await?,
        Command::Logout => handle_logout(client).await?,
        Command::Signup(args) => handle_signup(args, client).await?,
        Command::Reissue => handle_reissue(client).await?,
        Command::Whoami => handle_whoami(client).await?,
        Command::Profile(args) => handle_profile(args, client).await?,
        Command::Device(args) => handle_device(args, client).await?,
        Command::Categories => handle_categories(client).await?,
        Command::Today => handle_today(client).await?,
        Command::Problem(args) => handle_problem(args, client).await?,
        Command::History(args) => handle_history(args, client).await?,
        Command::Submit(args) => handle_submit(args, client).await?,
        Command::UpdateAnswer(args) => handle_update_answer(args, client).await?,
        Command::Streak => handle_streak(client).await?,
        Command::Config(_) => anyhow::bail!("config is handled before dispatch"),
    }
    Ok(())
}
