use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload while logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_question_bank().await {
        Ok(bank) => {
            if let Err(err) = bank.health_check().await {
                warn!(error = %err, "question bank health check failed");
            }
        }
        Err(_) => warn!("question bank unavailable (degraded mode)"),
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
