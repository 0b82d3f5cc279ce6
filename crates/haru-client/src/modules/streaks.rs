use haru_core::{ApiError, Streak};

use crate::http::ApiClient;

pub async fn get_streak(client: &ApiClient) -> Result<Streak, ApiError> {
    client.get_data("/v1/streaks").await
}
