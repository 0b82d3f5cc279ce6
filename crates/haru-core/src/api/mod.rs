pub mod auth;
pub mod categories;
pub mod envelope;
pub mod members;
pub mod problems;
pub mod storage;
pub mod streaks;
pub mod submissions;

pub use auth::*;
pub use categories::*;
pub use envelope::*;
pub use members::*;
pub use problems::*;
pub use storage::*;
pub use streaks::*;
pub use submissions::*;
