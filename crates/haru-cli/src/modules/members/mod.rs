mod actions;
pub(crate) mod args;

pub(crate) use actions::{handle_device, handle_profile, handle_whoami};
