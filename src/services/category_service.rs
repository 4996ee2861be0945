use crate::{dto::categories::CategoriesResponse, error::ServiceError, state::SharedState};

/// Distinct category names hosts can draw questions from.
pub async fn list_categories(state: &SharedState) -> Result<CategoriesResponse, ServiceError> {
    let bank = state.require_question_bank().await?;
    let categories = bank.list_categories().await?;
    Ok(CategoriesResponse { categories })
}
