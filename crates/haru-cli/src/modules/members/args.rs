use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::modules::auth::args::DifficultyArg;

#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    #[command(about = "Change the nickname and optionally the profile image")]
    Update(ProfileUpdateArgs),
    #[command(about = "Change the study topic and difficulty")]
    Preference(PreferenceArgs),
    #[command(about = "Upload an image and print its object key")]
    UploadImage(UploadImageArgs),
}

#[derive(Args)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub nickname: String,
    #[arg(long, help = "Object key returned by `haru profile upload-image`")]
    pub image_key: Option<String>,
}

#[derive(Args)]
pub struct PreferenceArgs {
    #[arg(long)]
    pub category_topic_id: i64,
    #[arg(long, value_enum)]
    pub difficulty: DifficultyArg,
}

#[derive(Args)]
pub struct UploadImageArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Subcommand)]
pub enum DeviceCommand {
    #[command(about = "Register a push-notification device token")]
    Sync(DeviceSyncArgs),
    #[command(about = "Remove the registered device token")]
    Delete,
}

#[derive(Args)]
pub struct DeviceSyncArgs {
    #[arg(long)]
    pub token: String,
}
