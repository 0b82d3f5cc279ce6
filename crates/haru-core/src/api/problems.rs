use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayProblem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub category_topic_name: String,
    pub is_solved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProblem {
    pub id: i64,
    pub difficulty: String,
    pub category_topic: String,
    pub title: String,
    pub is_solved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProblemDetail {
    pub id: i64,
    pub difficulty: String,
    pub category_topic: String,
    pub assigned_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ai_answer: Option<String>,
}

impl DailyProblemDetail {
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}
