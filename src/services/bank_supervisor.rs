//! Supervises the MongoDB question bank connection, retrying in the
//! background and toggling degraded mode when connectivity changes.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{dao::question_bank::mongodb::MongoQuestionBank, state::SharedState};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Connection settings for the MongoDB question bank.
pub struct BankSettings {
    /// MongoDB connection string.
    pub uri: String,
    /// Database holding the question content.
    pub db_name: String,
    /// Collection of question documents.
    pub collection: String,
}

/// Keep the question bank connected, entering degraded mode while it is not.
pub async fn run(state: SharedState, settings: BankSettings) {
    let mut delay = INITIAL_DELAY;

    loop {
        if let Some(bank) = state.question_bank().await {
            match bank.health_check().await {
                Ok(()) => {
                    // Healthy connection: reset the retry backoff and avoid
                    // hammering the database with pings.
                    delay = INITIAL_DELAY;
                    sleep(HEALTH_POLL_INTERVAL).await;
                }
                Err(err) => {
                    // Existing connection failed: drop it, flip to degraded
                    // mode, and retry with exponential backoff.
                    warn!(error = %err, "question bank health check failed; entering degraded mode");
                    state.clear_question_bank().await;
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_DELAY);
                }
            }
            continue;
        }

        match MongoQuestionBank::connect(&settings.uri, &settings.db_name, &settings.collection)
            .await
        {
            Ok(bank) => {
                info!("connected to question bank; leaving degraded mode");
                state.install_question_bank(Arc::new(bank)).await;
                delay = INITIAL_DELAY;
            }
            Err(err) => {
                // Could not reach MongoDB at all: wait and retry with
                // exponential backoff.
                warn!(error = %err, "question bank connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
