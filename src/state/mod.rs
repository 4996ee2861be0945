//! Shared application state and the in-process room store.

pub mod room;
pub mod store;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::question_bank::QuestionBank,
    error::ServiceError,
    state::store::RoomStore,
};

/// Cheaply cloneable handle to the shared state.
pub type SharedState = Arc<AppState>;

/// Central application state storing the room store, the question bank
/// handle, and the degraded-mode flag.
pub struct AppState {
    config: AppConfig,
    rooms: RoomStore,
    question_bank: RwLock<Option<Arc<dyn QuestionBank>>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a question bank is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            rooms: RoomStore::new(),
            question_bank: RwLock::new(None),
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The store holding every active room.
    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    /// Obtain a handle to the current question bank, if one is installed.
    pub async fn question_bank(&self) -> Option<Arc<dyn QuestionBank>> {
        let guard = self.question_bank.read().await;
        guard.as_ref().cloned()
    }

    /// Question bank handle, or a degraded-mode error when none is installed.
    pub async fn require_question_bank(&self) -> Result<Arc<dyn QuestionBank>, ServiceError> {
        self.question_bank().await.ok_or(ServiceError::Degraded)
    }

    /// Install a question bank implementation and leave degraded mode.
    pub async fn install_question_bank(&self, bank: Arc<dyn QuestionBank>) {
        {
            let mut guard = self.question_bank.write().await;
            *guard = Some(bank);
        }
        self.update_degraded(false);
    }

    /// Remove the current question bank and enter degraded mode.
    pub async fn clear_question_bank(&self) {
        {
            let mut guard = self.question_bank.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update the degraded flag, notifying watchers when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }
}
