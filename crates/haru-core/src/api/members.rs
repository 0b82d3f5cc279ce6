use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::auth::Difficulty;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub login_id: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
    pub category_topic_name: String,
    pub difficulty: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceUpdateRequest {
    pub category_topic_id: i64,
    pub difficulty: Difficulty,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenSyncRequest {
    pub device_token: String,
}
