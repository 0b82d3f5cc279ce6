use std::io::{self, Write};

use haru_client::modules::auth;
use haru_client::ApiClient;
use haru_core::{LoginRequest, SignupRequest};
use serde_json::json;

use super::args::{LoginArgs, SignupArgs};
use crate::modules::system::{print_done, print_json};

pub(crate) async fn handle_login(args: LoginArgs, client: &ApiClient) -> anyhow::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    let request = LoginRequest {
        login_id: args.login_id,
        password,
    };
    auth::login_and_store(client, &request).await?;
    print_done("Logged in");
    Ok(())
}

pub(crate) async fn handle_signup(args: SignupArgs, client: &ApiClient) -> anyhow::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    let request = SignupRequest {
        login_id: args.login_id,
        password,
        nickname: args.nickname,
        category_topic_id: args.category_topic_id,
        difficulty: args.difficulty.into(),
    };
    let member_id = auth::signup(client, &request).await?;
    print_json(&json!({ "memberId": member_id }))
}

/// Exchanges the stored refresh token for a new pair and stores it.
pub(crate) async fn handle_reissue(client: &ApiClient) -> anyhow::Result<()> {
    let refresh_token = client
        .tokens()
        .refresh_token()?
        .ok_or_else(|| anyhow::anyhow!("not logged in; run `haru login`"))?;
    let tokens = auth::reissue(client, &refresh_token).await?;
    client.set_tokens(&tokens)?;
    print_done("Tokens reissued");
    Ok(())
}

pub(crate) async fn handle_logout(client: &ApiClient) -> anyhow::Result<()> {
    match auth::logout(client).await {
        Ok(()) => print_done("Logged out"),
        Err(err) => {
            eprintln!("Warning: server logout failed: {err}");
            print_done("Logged out locally");
        }
    }
    Ok(())
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    let mut input = String::new();
    print!("{prompt}");
    io::stdout().flush()?;
    io::stdin().read_line(&mut input)?;
    let password = input.trim_end_matches(['\r', '\n']).to_string();
    if password.trim().is_empty() {
        anyhow::bail!("password is required");
    }
    Ok(password)
}
