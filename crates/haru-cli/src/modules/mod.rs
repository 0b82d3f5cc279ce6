pub(crate) mod auth;
pub(crate) mod learning;
pub(crate) mod members;
pub(crate) mod system;
