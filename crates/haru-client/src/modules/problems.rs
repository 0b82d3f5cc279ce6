use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use futures_util::future::join_all;
use haru_core::{ApiError, DailyProblem, DailyProblemDetail, ErrorKind, TodayProblem};
use tracing::debug;

use crate::http::{ApiClient, ApiRequest};

pub async fn today_problem(client: &ApiClient) -> Result<TodayProblem, ApiError> {
    client.get_data("/v1/daily-problem/today").await
}

/// Preview of the problem assigned on `date`, or today when `None`.
pub async fn daily_problem(
    client: &ApiClient,
    date: Option<NaiveDate>,
) -> Result<DailyProblem, ApiError> {
    let mut request = ApiRequest::get("/v1/daily-problem");
    if let Some(date) = date {
        request = request.query("date", date.format("%Y-%m-%d").to_string());
    }
    client.request_data(&request).await
}

pub async fn problem_detail(
    client: &ApiClient,
    daily_problem_id: i64,
) -> Result<DailyProblemDetail, ApiError> {
    client
        .get_data(&format!("/v1/daily-problem/{daily_problem_id}"))
        .await
}

/// Problems for every day of `month`, fetched concurrently. A day whose
/// lookup fails maps to `None`.
pub async fn monthly_history(
    client: &ApiClient,
    year: i32,
    month: u32,
) -> Result<BTreeMap<NaiveDate, Option<DailyProblem>>, ApiError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        ApiError::new(ErrorKind::Validation)
            .with_details(serde_json::Value::String(format!("invalid month {year}-{month:02}")))
    })?;
    let days: Vec<NaiveDate> = first
        .iter_days()
        .take_while(|day| day.month() == month)
        .collect();

    let lookups = days.iter().map(|day| async move {
        match daily_problem(client, Some(*day)).await {
            Ok(problem) => (*day, Some(problem)),
            Err(err) => {
                debug!(date = %day, error = %err, "no problem for day");
                (*day, None)
            }
        }
    });
    Ok(join_all(lookups).await.into_iter().collect())
}
