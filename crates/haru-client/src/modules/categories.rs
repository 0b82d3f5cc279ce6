use haru_core::{ApiError, CategoryList};

use crate::http::ApiClient;

pub async fn list_categories(client: &ApiClient) -> Result<CategoryList, ApiError> {
    client.get_data("/v1/categories").await
}
