use haru_client::modules::{members, storage};
use haru_client::ApiClient;
use haru_core::{PreferenceUpdateRequest, ProfileUpdateRequest};
use serde_json::json;

use super::args::{DeviceArgs, DeviceCommand, ProfileArgs, ProfileCommand, UploadImageArgs};
use crate::modules::system::{print_done, print_json};

pub(crate) async fn handle_whoami(client: &ApiClient) -> anyhow::Result<()> {
    let profile = members::get_profile(client).await?;
    print_json(&profile)
}

pub(crate) async fn handle_profile(args: ProfileArgs, client: &ApiClient) -> anyhow::Result<()> {
    match args.command {
        ProfileCommand::Update(args) => {
            let request = ProfileUpdateRequest {
                nickname: args.nickname,
                profile_image_key: args.image_key,
            };
            members::update_profile(client, &request).await?;
            print_done("Profile updated");
        }
        ProfileCommand::Preference(args) => {
            let request = PreferenceUpdateRequest {
                category_topic_id: args.category_topic_id,
                difficulty: args.difficulty.into(),
            };
            members::update_preference(client, &request).await?;
            print_done("Preference updated");
        }
        ProfileCommand::UploadImage(args) => upload_image(args, client).await?,
    }
    Ok(())
}

async fn upload_image(args: UploadImageArgs, client: &ApiClient) -> anyhow::Result<()> {
    let file_name = args
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid image path: {}", args.path.display()))?
        .to_string();
    let content_type = mime_guess::from_path(&args.path)
        .first_or_octet_stream()
        .to_string();
    if !content_type.starts_with("image/") {
        anyhow::bail!("not an image: {} ({content_type})", args.path.display());
    }
    let bytes = tokio::fs::read(&args.path)
        .await
        .map_err(|err| anyhow::anyhow!("failed to read {}: {err}", args.path.display()))?;
    let object_key = storage::upload_profile_image(client, &file_name, bytes, &content_type).await?;
    print_json(&json!({ "objectKey": object_key }))
}

pub(crate) async fn handle_device(args: DeviceArgs, client: &ApiClient) -> anyhow::Result<()> {
    match args.command {
        DeviceCommand::Sync(args) => {
            members::sync_device_token(client, &args.token).await?;
            print_done("Device token registered");
        }
        DeviceCommand::Delete => {
            members::delete_device_token(client).await?;
            print_done("Device token removed");
        }
    }
    Ok(())
}
