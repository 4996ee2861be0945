use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        format_system_time,
        phase::VisibleRoomPhase,
        validation::{validate_player_name, validate_room_code},
    },
    state::room::{POINTS_PER_CORRECT, Room, RoomPhase},
};

/// Payload used to open a brand-new multiplayer room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    /// Display name of the creating player, who becomes the host.
    pub host_name: String,
    /// Categories to draw questions from. Must not be empty.
    pub categories: Vec<String>,
}

impl Validate for CreateRoomRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_player_name(&self.host_name) {
            errors.add("host_name", e);
        }

        if self.categories.is_empty() {
            let mut e = validator::ValidationError::new("categories_empty");
            e.message = Some("Select at least one category".into());
            errors.add("categories", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload used to join an existing room while it is waiting.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRoomRequest {
    /// Display name to join under. Rejoining under a taken name replaces
    /// that player's record.
    pub player_name: String,
}

impl Validate for JoinRoomRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_name(&self.player_name) {
            errors.add("player_name", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Explicit session context issued on create/join and echoed back on every
/// subsequent room operation. Cleared client-side on leave or room closure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionContext {
    /// Code of the room the session belongs to.
    pub room_code: String,
    /// Player this session acts as.
    pub player_name: String,
    /// Whether the session holds the host role.
    pub is_host: bool,
}

impl Validate for SessionContext {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_room_code(&self.room_code) {
            errors.add("room_code", e);
        }
        if let Err(e) = validate_player_name(&self.player_name) {
            errors.add("player_name", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Request carrying only the acting session, used by host transitions and leave.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SessionRequest {
    /// Acting session.
    pub session: SessionContext,
}

impl Validate for SessionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.merge_self("session", self.session.validate());
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Answer submission for the currently open question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    /// Acting session.
    pub session: SessionContext,
    /// Index of the question being answered; must match the open question.
    pub question_index: usize,
    /// Selected option index.
    pub option_index: usize,
}

impl Validate for AnswerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.merge_self("session", self.session.validate());
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Response returned once a room has been created.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomCreatedResponse {
    /// Shareable room code.
    pub code: String,
    /// Session context for the host.
    pub session: SessionContext,
    /// Initial room snapshot.
    pub room: RoomSnapshot,
}

/// Response returned once a player has joined a room.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinedResponse {
    /// Session context for the joining player.
    pub session: SessionContext,
    /// Room snapshot at join time.
    pub room: RoomSnapshot,
}

/// Generic acknowledgement payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable confirmation.
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Public projection of a player exposed to REST/SSE clients.
pub struct PlayerSummary {
    pub name: String,
    pub score: u32,
    pub is_host: bool,
    /// Whether the player has answered the currently open question.
    pub answered: bool,
}

/// The open question as shown while answers are being collected. The correct
/// option is only disclosed through [`RevealView`].
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionView {
    pub index: usize,
    pub category: String,
    pub prompt: String,
    pub options: Vec<String>,
}

/// Per-player outcome of one scored question, ranked by points.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AwardView {
    pub player: String,
    pub correct: bool,
    pub points: u32,
    /// Total score after this question was scored.
    pub total: u32,
}

/// Answer reveal shown during the results phase.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RevealView {
    pub correct_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub awards: Vec<AwardView>,
}

/// One row of the final scoreboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingEntry {
    pub rank: usize,
    pub name: String,
    pub score: u32,
}

/// Full room projection delivered on every committed write. Clients derive
/// their entire view from this snapshot plus their own session context.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomSnapshot {
    pub code: String,
    pub host: String,
    pub phase: VisibleRoomPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<usize>,
    pub question_count: usize,
    pub categories: Vec<String>,
    pub created_at: String,
    pub players: Vec<PlayerSummary>,
    /// Present while playing and during results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    /// Present during results only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<RevealView>,
    /// Present once the room is finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standings: Option<Vec<StandingEntry>>,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        let current = room.current();

        let question = match (room.phase, current) {
            (RoomPhase::Playing | RoomPhase::Results, Some((index, q))) => Some(QuestionView {
                index,
                category: q.category.clone(),
                prompt: q.prompt.clone(),
                options: q.options.clone(),
            }),
            _ => None,
        };

        let reveal = match (room.phase, current) {
            (RoomPhase::Results, Some((index, q))) => Some(RevealView {
                correct_index: q.correct_index,
                explanation: q.explanation.clone(),
                awards: question_awards(room, index, q.correct_index),
            }),
            _ => None,
        };

        let standings = matches!(room.phase, RoomPhase::Finished).then(|| {
            room.standings()
                .iter()
                .enumerate()
                .map(|(position, player)| StandingEntry {
                    rank: position + 1,
                    name: player.name.clone(),
                    score: player.score,
                })
                .collect()
        });

        let players = room
            .players
            .values()
            .map(|player| PlayerSummary {
                name: player.name.clone(),
                score: player.score,
                is_host: player.name == room.host,
                answered: room
                    .current_question
                    .map(|index| player.answers.contains_key(&index))
                    .unwrap_or(false),
            })
            .collect();

        Self {
            code: room.code.clone(),
            host: room.host.clone(),
            phase: (&room.phase).into(),
            current_question: room.current_question,
            question_count: room.questions.len(),
            categories: room.categories.clone(),
            created_at: format_system_time(room.created_at),
            players,
            question,
            reveal,
            standings,
        }
    }
}

/// Awards recomputed from the committed answers, ranked by points with join
/// order breaking ties. Scores already include the pass, so `total` is the
/// player's current score.
fn question_awards(room: &Room, index: usize, correct_index: usize) -> Vec<AwardView> {
    let mut awards: Vec<AwardView> = room
        .players
        .values()
        .filter_map(|player| {
            let record = player.answers.get(&index)?;
            let correct = record.answer == correct_index;
            Some(AwardView {
                player: player.name.clone(),
                correct,
                points: if correct { POINTS_PER_CORRECT } else { 0 },
                total: player.score,
            })
        })
        .collect();

    awards.sort_by(|a, b| b.points.cmp(&a.points));
    awards
}
