use serde::{Deserialize, Serialize};

/// Success wrapper used by most backend endpoints: `{ "data": T, ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> T {
        self.data
    }
}
