//! Administrative expiry sweep for abandoned rooms.
//!
//! Gameplay never deletes a room record; this sweep is the only collector.
//! Watchers of a collected room observe `None` and surface "room closed".

use tokio::time::sleep;
use tracing::info;

use crate::state::SharedState;

/// Periodically remove rooms older than the configured TTL.
pub async fn run(state: SharedState) {
    let interval = state.config().reap_interval;
    let ttl = state.config().room_ttl;

    loop {
        sleep(interval).await;

        for code in state.rooms().expired(ttl) {
            if state.rooms().remove(&code) {
                info!(%code, "expired room removed");
            }
        }
    }
}
