use serde::Serialize;
use utoipa::ToSchema;

use crate::state::room::RoomPhase;

/// Publicly visible room phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleRoomPhase {
    /// Lobby: the room accepts joins.
    Waiting,
    /// A question is open for answers.
    Playing,
    /// The current question's answer and awards are shown.
    Results,
    /// The game ended; final standings are shown.
    Finished,
}

impl From<&RoomPhase> for VisibleRoomPhase {
    fn from(value: &RoomPhase) -> Self {
        match value {
            RoomPhase::Waiting => VisibleRoomPhase::Waiting,
            RoomPhase::Playing => VisibleRoomPhase::Playing,
            RoomPhase::Results => VisibleRoomPhase::Results,
            RoomPhase::Finished => VisibleRoomPhase::Finished,
        }
    }
}
