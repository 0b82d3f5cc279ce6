use haru_core::{ApiError, SubmitSolutionRequest, Submission};

use crate::http::ApiClient;

fn submissions_path(daily_problem_id: i64) -> String {
    format!("/v1/daily-problem/{daily_problem_id}/submissions")
}

pub async fn submit_answer(
    client: &ApiClient,
    daily_problem_id: i64,
    answer: &str,
) -> Result<Submission, ApiError> {
    let payload = SubmitSolutionRequest {
        user_answer: answer.to_string(),
    };
    client
        .post_data(&submissions_path(daily_problem_id), &payload)
        .await
}

/// Only accepted by the backend on the day the problem was assigned.
pub async fn update_answer(
    client: &ApiClient,
    daily_problem_id: i64,
    answer: &str,
) -> Result<Submission, ApiError> {
    let payload = SubmitSolutionRequest {
        user_answer: answer.to_string(),
    };
    client
        .patch_data(&submissions_path(daily_problem_id), &payload)
        .await
}
