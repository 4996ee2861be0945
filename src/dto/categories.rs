use serde::Serialize;
use utoipa::ToSchema;

/// Distinct category names available for room creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}
