use haru_core::{ApiError, LoginRequest, SignupRequest, TokenPair, TokenReissueRequest};
use tracing::{info, warn};

use crate::http::{ApiClient, ApiRequest};

/// Creates the member and returns its id.
pub async fn signup(client: &ApiClient, request: &SignupRequest) -> Result<i64, ApiError> {
    let request = ApiRequest::post("/v1/members/sign-up")
        .anonymous()
        .json(request)?;
    client.request_data(&request).await
}

pub async fn login(client: &ApiClient, request: &LoginRequest) -> Result<TokenPair, ApiError> {
    let request = ApiRequest::post("/v1/auth/login").anonymous().json(request)?;
    client.request_data(&request).await
}

/// Logs in and persists the issued pair in the client's token store.
pub async fn login_and_store(client: &ApiClient, request: &LoginRequest) -> Result<(), ApiError> {
    let tokens = login(client, request).await?;
    client.set_tokens(&tokens)?;
    info!(login_id = %request.login_id, "logged in");
    Ok(())
}

/// Explicit reissue through the versioned endpoint; the automatic refresh
/// inside [`ApiClient`] does not go through here.
pub async fn reissue(client: &ApiClient, refresh_token: &str) -> Result<TokenPair, ApiError> {
    let payload = TokenReissueRequest {
        refresh_token: refresh_token.to_string(),
    };
    let request = ApiRequest::post("/v1/auth/reissue")
        .anonymous()
        .json(&payload)?;
    client.request_data(&request).await
}

/// Tells the backend to end the session, then drops the local tokens even
/// when that call failed.
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    let remote = client.send(&ApiRequest::post("/v1/auth/logout")).await;
    if let Err(err) = &remote {
        warn!(error = %err, "logout request failed; clearing local tokens anyway");
    }
    client.clear_tokens()?;
    remote
}
