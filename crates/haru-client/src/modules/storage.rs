use haru_core::{ApiError, PresignedCreateRequest, PresignedUrl, UploadCompleteRequest, UploadType};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use crate::http::{map_transport_error, ApiClient, ApiRequest};

pub async fn create_presigned_url(
    client: &ApiClient,
    request: &PresignedCreateRequest,
) -> Result<PresignedUrl, ApiError> {
    client.post_data("/v1/storage/presigned-url", request).await
}

/// Uploads straight to object storage. The presigned URL carries its own
/// authorization, so no bearer token is attached.
pub async fn upload_to_presigned_url(
    client: &ApiClient,
    presigned_url: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<(), ApiError> {
    let size = bytes.len();
    let response = client
        .raw_http()
        .put(presigned_url)
        .timeout(client.config().timeout)
        .header(CONTENT_TYPE, content_type)
        .body(bytes)
        .send()
        .await
        .map_err(|err| map_transport_error(&err, client.config()))?;
    let status = response.status();
    debug!(status = %status, size, "presigned upload response");
    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        return Err(ApiError::from_response(status.as_u16(), &body));
    }
    Ok(())
}

pub async fn notify_upload_complete(client: &ApiClient, object_key: &str) -> Result<(), ApiError> {
    let payload = UploadCompleteRequest {
        object_key: object_key.to_string(),
    };
    client
        .send(&ApiRequest::post("/v1/storage/upload-complete").json(&payload)?)
        .await
}

/// Presigned URL, upload, completion notice. Returns the object key to pass
/// as `profile_image_key` when updating the profile.
pub async fn upload_profile_image(
    client: &ApiClient,
    file_name: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<String, ApiError> {
    let presigned = create_presigned_url(
        client,
        &PresignedCreateRequest {
            file_name: file_name.to_string(),
            upload_type: UploadType::ProfileImage,
        },
    )
    .await?;
    upload_to_presigned_url(client, &presigned.presigned_url, bytes, content_type).await?;
    notify_upload_complete(client, &presigned.object_key).await?;
    info!(object_key = %presigned.object_key, "profile image uploaded");
    Ok(presigned.object_key)
}
