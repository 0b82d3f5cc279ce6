use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSolutionRequest {
    pub user_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub submission_id: i64,
    pub daily_problem_id: i64,
    pub user_answer: String,
    pub submitted_at: DateTime<Utc>,
    /// True when the submission counted towards the streak.
    pub is_on_time: bool,
    #[serde(default)]
    pub ai_answer: Option<String>,
}
