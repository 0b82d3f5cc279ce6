use haru_core::{
    ApiError, DeviceTokenSyncRequest, MemberProfile, PreferenceUpdateRequest,
    ProfileUpdateRequest,
};

use crate::http::{ApiClient, ApiRequest};

pub async fn get_profile(client: &ApiClient) -> Result<MemberProfile, ApiError> {
    client.get_data("/v1/members").await
}

pub async fn update_profile(
    client: &ApiClient,
    request: &ProfileUpdateRequest,
) -> Result<(), ApiError> {
    client
        .send(&ApiRequest::patch("/v1/members").json(request)?)
        .await
}

pub async fn update_preference(
    client: &ApiClient,
    request: &PreferenceUpdateRequest,
) -> Result<(), ApiError> {
    client
        .send(&ApiRequest::patch("/v1/members/preferences").json(request)?)
        .await
}

/// Registers the push-notification device token for the current member.
pub async fn sync_device_token(client: &ApiClient, device_token: &str) -> Result<(), ApiError> {
    let payload = DeviceTokenSyncRequest {
        device_token: device_token.to_string(),
    };
    client
        .send(&ApiRequest::patch("/v1/members/devices").json(&payload)?)
        .await
}

pub async fn delete_device_token(client: &ApiClient) -> Result<(), ApiError> {
    client
        .send(&ApiRequest::delete("/v1/members/devices"))
        .await
}
