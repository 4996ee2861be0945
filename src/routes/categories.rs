use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::categories::CategoriesResponse, error::AppError, services::category_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Available question categories", body = CategoriesResponse),
        (status = 503, description = "Question bank unavailable")
    )
)]
/// List the question categories available for room creation.
pub async fn list_categories(
    State(state): State<SharedState>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let payload = category_service::list_categories(&state).await?;
    Ok(Json(payload))
}

/// Configure the category routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/categories", get(list_categories))
}
