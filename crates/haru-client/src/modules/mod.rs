pub mod auth;
pub mod categories;
pub mod members;
pub mod problems;
pub mod storage;
pub mod streaks;
pub mod submissions;
