//! Room lifecycle operations. Codes are allocated server-side against the
//! store, so two hosts can never end up sharing a room.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    dto::room::{
        ActionResponse, CreateRoomRequest, JoinRoomRequest, JoinedResponse, RoomCreatedResponse,
        RoomSnapshot, SessionContext,
    },
    error::ServiceError,
    state::{
        SharedState,
        room::{Player, Question, ROOM_CODE_LENGTH, Room, RoomPhase},
    },
};

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_CODE_ATTEMPTS: usize = 16;

/// Create a room for the given host, drawing questions from the bank.
pub async fn create_room(
    state: &SharedState,
    request: CreateRoomRequest,
) -> Result<RoomCreatedResponse, ServiceError> {
    let host_name = sanitize_player_name(&request.host_name)?;
    let categories = normalize_categories(request.categories)?;

    let bank = state.require_question_bank().await?;
    let entities = bank.questions_for_categories(categories.clone()).await?;
    let questions: Vec<Question> = entities
        .into_iter()
        .take(state.config().questions_per_room)
        .map(Into::into)
        .collect();

    if questions.is_empty() {
        warn!(?categories, "creating room with no matching questions");
    }

    let mut attempts = 0;
    loop {
        let code = generate_room_code();
        let room = Room::new(
            code.clone(),
            host_name.clone(),
            categories.clone(),
            questions.clone(),
        );
        let snapshot = RoomSnapshot::from(&room);

        if state.rooms().insert(room) {
            info!(%code, host = %host_name, questions = snapshot.question_count, "room created");
            return Ok(RoomCreatedResponse {
                code: code.clone(),
                session: SessionContext {
                    room_code: code,
                    player_name: host_name,
                    is_host: true,
                },
                room: snapshot,
            });
        }

        attempts += 1;
        if attempts >= MAX_CODE_ATTEMPTS {
            return Err(ServiceError::InvalidState(
                "failed to allocate a unique room code".into(),
            ));
        }
        warn!(%code, attempts, "room code collision; regenerating");
    }
}

/// Join a waiting room under the given name.
///
/// Joining under a name that is already taken replaces that player's record
/// with a fresh zero-score one.
pub async fn join_room(
    state: &SharedState,
    code: &str,
    request: JoinRoomRequest,
) -> Result<JoinedResponse, ServiceError> {
    let player_name = sanitize_player_name(&request.player_name)?;

    let (snapshot, is_host) = with_room(state, code, |room| {
        if room.phase != RoomPhase::Waiting {
            return Err(ServiceError::InvalidState("game already started".into()));
        }

        room.players
            .insert(player_name.clone(), Player::new(player_name.clone()));
        let is_host = player_name == room.host;
        Ok((RoomSnapshot::from(&*room), is_host))
    })?;

    info!(%code, player = %player_name, "player joined room");
    Ok(JoinedResponse {
        session: SessionContext {
            room_code: code.to_string(),
            player_name,
            is_host,
        },
        room: snapshot,
    })
}

/// Remove a player's record from the room, best effort.
///
/// The host role is never transferred: when the host leaves, the room stays
/// headless until the expiry sweep collects it. Leaving an unknown room is
/// treated as already closed.
pub async fn leave_room(
    state: &SharedState,
    code: &str,
    session: &SessionContext,
) -> Result<ActionResponse, ServiceError> {
    let outcome = state.rooms().transact(code, |room| {
        room.players.shift_remove(&session.player_name);
        Ok::<(), ServiceError>(())
    });

    match outcome {
        Some(result) => result?,
        None => debug!(%code, "leave for unknown room ignored"),
    }

    info!(%code, player = %session.player_name, "player left room");
    Ok(ActionResponse {
        message: "left room".into(),
    })
}

/// Point-in-time snapshot of a room.
pub fn room_snapshot(state: &SharedState, code: &str) -> Result<RoomSnapshot, ServiceError> {
    let room = state
        .rooms()
        .read(code)
        .ok_or_else(|| room_not_found(code))?;
    Ok(RoomSnapshot::from(&room))
}

/// Run a fallible mutation against one room inside the store's transaction,
/// mapping an absent room to [`ServiceError::NotFound`].
pub(crate) fn with_room<T>(
    state: &SharedState,
    code: &str,
    mutate: impl FnOnce(&mut Room) -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    state
        .rooms()
        .transact(code, mutate)
        .unwrap_or_else(|| Err(room_not_found(code)))
}

pub(crate) fn room_not_found(code: &str) -> ServiceError {
    ServiceError::NotFound(format!("room `{code}` not found"))
}

fn sanitize_player_name(input: &str) -> Result<String, ServiceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(
            "player name must not be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}

fn normalize_categories(categories: Vec<String>) -> Result<Vec<String>, ServiceError> {
    let categories: Vec<String> = categories
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if categories.is_empty() {
        return Err(ServiceError::InvalidInput(
            "select at least one category".into(),
        ));
    }
    Ok(categories)
}

fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..ROOM_CODE_ALPHABET.len());
            ROOM_CODE_ALPHABET[index] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::{phase::VisibleRoomPhase, validation::validate_room_code},
        services::testing::{StubBank, state_with_bank},
    };

    fn create_request(host: &str, categories: &[&str]) -> CreateRoomRequest {
        CreateRoomRequest {
            host_name: host.into(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_room_caps_questions_and_seats_only_the_host() {
        let state = state_with_bank(StubBank::with_questions("phishing", 12, 1)).await;

        let created = create_room(&state, create_request("host", &["phishing"]))
            .await
            .unwrap();

        assert_eq!(created.room.phase, VisibleRoomPhase::Waiting);
        assert_eq!(created.room.current_question, None);
        assert_eq!(created.room.question_count, 10);
        assert_eq!(created.room.players.len(), 1);
        assert_eq!(created.room.players[0].name, "host");
        assert_eq!(created.room.players[0].score, 0);
        assert!(created.session.is_host);
        assert!(validate_room_code(&created.code).is_ok());

        let stored = state.rooms().read(&created.code).unwrap();
        assert!(stored.scored_questions.is_empty());
    }

    #[tokio::test]
    async fn create_room_keeps_every_question_when_fewer_than_the_cap() {
        let state = state_with_bank(StubBank::with_questions("phishing", 3, 0)).await;
        let created = create_room(&state, create_request("host", &["phishing"]))
            .await
            .unwrap();
        assert_eq!(created.room.question_count, 3);
    }

    #[tokio::test]
    async fn create_room_rejects_empty_categories() {
        let state = state_with_bank(StubBank::with_questions("phishing", 5, 0)).await;
        let err = create_room(&state, create_request("host", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = create_room(&state, create_request("host", &["  "]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn create_room_fails_without_a_question_bank() {
        let state = crate::state::AppState::new(crate::config::AppConfig::default());
        let err = create_room(&state, create_request("host", &["phishing"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }

    #[tokio::test]
    async fn join_adds_a_second_player() {
        let state = state_with_bank(StubBank::with_questions("phishing", 5, 0)).await;
        let created = create_room(&state, create_request("host", &["phishing"]))
            .await
            .unwrap();

        let joined = join_room(&state, &created.code, JoinRoomRequest {
            player_name: "Bob".into(),
        })
        .await
        .unwrap();

        assert_eq!(joined.room.players.len(), 2);
        assert!(!joined.session.is_host);
        assert_eq!(joined.session.player_name, "Bob");
    }

    #[tokio::test]
    async fn join_unknown_room_is_not_found() {
        let state = state_with_bank(StubBank::with_questions("phishing", 5, 0)).await;
        let err = join_room(&state, "ZZZZZZ", JoinRoomRequest {
            player_name: "Bob".into(),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejoining_under_the_same_name_resets_the_record() {
        let state = state_with_bank(StubBank::with_questions("phishing", 5, 0)).await;
        let created = create_room(&state, create_request("host", &["phishing"]))
            .await
            .unwrap();
        join_room(&state, &created.code, JoinRoomRequest {
            player_name: "Bob".into(),
        })
        .await
        .unwrap();

        state
            .rooms()
            .transact(&created.code, |room| {
                room.players.get_mut("Bob").ok_or("missing")?.score = 3000;
                Ok::<(), &str>(())
            })
            .unwrap()
            .unwrap();

        let rejoined = join_room(&state, &created.code, JoinRoomRequest {
            player_name: "Bob".into(),
        })
        .await
        .unwrap();

        let bob = rejoined
            .room
            .players
            .iter()
            .find(|p| p.name == "Bob")
            .unwrap();
        assert_eq!(bob.score, 0);
        assert_eq!(rejoined.room.players.len(), 2);
    }

    #[tokio::test]
    async fn leave_removes_the_player_and_tolerates_unknown_rooms() {
        let state = state_with_bank(StubBank::with_questions("phishing", 5, 0)).await;
        let created = create_room(&state, create_request("host", &["phishing"]))
            .await
            .unwrap();
        let joined = join_room(&state, &created.code, JoinRoomRequest {
            player_name: "Bob".into(),
        })
        .await
        .unwrap();

        leave_room(&state, &created.code, &joined.session)
            .await
            .unwrap();
        let room = state.rooms().read(&created.code).unwrap();
        assert!(!room.players.contains_key("Bob"));

        // The room record is long gone: leave still succeeds.
        leave_room(&state, "ZZZZZZ", &joined.session).await.unwrap();
    }

    #[test]
    fn generated_codes_use_the_shareable_alphabet() {
        for _ in 0..64 {
            let code = generate_room_code();
            assert!(validate_room_code(&code).is_ok(), "bad code {code}");
        }
    }
}
