//! Gameplay operations. Host transitions and scoring run inside the store's
//! per-room transaction, so phase, question index, lock claim, and score
//! deltas always land as one committed write.

use std::time::SystemTime;

use tracing::{debug, info};

use crate::{
    dto::room::{AnswerRequest, RoomSnapshot, SessionContext, SessionRequest},
    error::ServiceError,
    services::room_service::with_room,
    state::{
        SharedState,
        room::{AnswerRecord, HostEvent, Room, RoomPhase},
    },
};

/// Open the first question. Host only; the room must still be waiting.
pub async fn start_game(
    state: &SharedState,
    code: &str,
    request: SessionRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let snapshot = with_room(state, code, |room| {
        ensure_session(room, &request.session)?;
        ensure_host(room, &request.session)?;

        if room.questions.is_empty() {
            return Err(ServiceError::InvalidState(
                "room has no questions to play".into(),
            ));
        }

        room.apply(HostEvent::Start)?;
        Ok(RoomSnapshot::from(&*room))
    })?;

    info!(%code, "game started");
    Ok(snapshot)
}

/// Record a player's answer for the currently open question.
///
/// Distinct players write distinct subtrees and never collide; a repeat
/// submission by the same player overwrites the earlier one.
pub async fn submit_answer(
    state: &SharedState,
    code: &str,
    request: AnswerRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let snapshot = with_room(state, code, |room| {
        ensure_session(room, &request.session)?;

        if room.phase != RoomPhase::Playing {
            return Err(ServiceError::InvalidState(
                "answers are only accepted while a question is open".into(),
            ));
        }

        let (index, question) = room.current().ok_or_else(|| {
            ServiceError::InvalidState("no question is currently open".into())
        })?;
        if request.question_index != index {
            return Err(ServiceError::InvalidState(format!(
                "question {} is not the open question",
                request.question_index
            )));
        }
        if request.option_index >= question.options.len() {
            return Err(ServiceError::InvalidInput(format!(
                "option {} does not exist for this question",
                request.option_index
            )));
        }

        let player = room
            .players
            .get_mut(&request.session.player_name)
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "player `{}` is not in this room",
                    request.session.player_name
                ))
            })?;

        player.answers.insert(index, AnswerRecord {
            answer: request.option_index,
            timestamp: SystemTime::now(),
        });
        Ok(RoomSnapshot::from(&*room))
    })?;

    debug!(%code, player = %request.session.player_name, "answer recorded");
    Ok(snapshot)
}

/// Close the open question, reveal its answer, and score it. Host only.
///
/// The scoring pass is guarded by the per-question lock, so a duplicated
/// reveal (second host tab, replayed request) leaves scores untouched.
pub async fn reveal_question(
    state: &SharedState,
    code: &str,
    request: SessionRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let snapshot = with_room(state, code, |room| {
        ensure_session(room, &request.session)?;
        ensure_host(room, &request.session)?;

        room.apply(HostEvent::Reveal)?;

        let index = room.current_question.ok_or_else(|| {
            ServiceError::InvalidState("no question is currently open".into())
        })?;
        match room.score_question(index) {
            Some(awards) => {
                let correct = awards.iter().filter(|award| award.correct).count();
                debug!(index, answered = awards.len(), correct, "question scored");
            }
            None => debug!(index, "question already scored; skipping"),
        }

        Ok(RoomSnapshot::from(&*room))
    })?;

    info!(%code, question = ?snapshot.current_question, "question revealed");
    Ok(snapshot)
}

/// Advance to the next question, or finish the game when none remain. Host only.
pub async fn next_question(
    state: &SharedState,
    code: &str,
    request: SessionRequest,
) -> Result<RoomSnapshot, ServiceError> {
    let snapshot = with_room(state, code, |room| {
        ensure_session(room, &request.session)?;
        ensure_host(room, &request.session)?;

        room.apply(HostEvent::Next)?;
        Ok(RoomSnapshot::from(&*room))
    })?;

    info!(%code, phase = ?snapshot.phase, question = ?snapshot.current_question, "room advanced");
    Ok(snapshot)
}

fn ensure_session(room: &Room, session: &SessionContext) -> Result<(), ServiceError> {
    if session.room_code != room.code {
        return Err(ServiceError::InvalidInput(format!(
            "session belongs to room `{}`, not `{}`",
            session.room_code, room.code
        )));
    }
    Ok(())
}

fn ensure_host(room: &Room, session: &SessionContext) -> Result<(), ServiceError> {
    if session.player_name != room.host {
        return Err(ServiceError::Unauthorized(
            "only the host can drive the game".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::{
            phase::VisibleRoomPhase,
            room::{CreateRoomRequest, JoinRoomRequest},
        },
        services::{
            room_service::{create_room, join_room},
            testing::{StubBank, state_with_bank},
        },
        state::room::POINTS_PER_CORRECT,
    };

    struct Fixture {
        state: SharedState,
        code: String,
        host: SessionContext,
        bob: SessionContext,
    }

    /// Room with 10 "phishing" questions (correct option 1) and Bob joined.
    async fn fixture() -> Fixture {
        let state = state_with_bank(StubBank::with_questions("phishing", 12, 1)).await;
        let created = create_room(&state, CreateRoomRequest {
            host_name: "host".into(),
            categories: vec!["phishing".into()],
        })
        .await
        .unwrap();
        let joined = join_room(&state, &created.code, JoinRoomRequest {
            player_name: "Bob".into(),
        })
        .await
        .unwrap();

        Fixture {
            state,
            code: created.code,
            host: created.session,
            bob: joined.session,
        }
    }

    fn host_request(fixture: &Fixture) -> SessionRequest {
        SessionRequest {
            session: fixture.host.clone(),
        }
    }

    fn answer(session: &SessionContext, question: usize, option: usize) -> AnswerRequest {
        AnswerRequest {
            session: session.clone(),
            question_index: question,
            option_index: option,
        }
    }

    #[tokio::test]
    async fn only_the_host_can_drive_the_game() {
        let fixture = fixture().await;
        let err = start_game(&fixture.state, &fixture.code, SessionRequest {
            session: fixture.bob.clone(),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn answers_are_rejected_while_waiting() {
        let fixture = fixture().await;
        let err = submit_answer(
            &fixture.state,
            &fixture.code,
            answer(&fixture.bob, 0, 2),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn joining_after_start_fails_without_mutating_players() {
        let fixture = fixture().await;
        start_game(&fixture.state, &fixture.code, host_request(&fixture))
            .await
            .unwrap();

        let err = join_room(&fixture.state, &fixture.code, JoinRoomRequest {
            player_name: "Eve".into(),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let room = fixture.state.rooms().read(&fixture.code).unwrap();
        assert_eq!(room.players.len(), 2);
        assert!(!room.players.contains_key("Eve"));
    }

    #[tokio::test]
    async fn stale_question_index_is_rejected() {
        let fixture = fixture().await;
        start_game(&fixture.state, &fixture.code, host_request(&fixture))
            .await
            .unwrap();

        let err = submit_answer(
            &fixture.state,
            &fixture.code,
            answer(&fixture.bob, 3, 1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn out_of_range_option_is_rejected() {
        let fixture = fixture().await;
        start_game(&fixture.state, &fixture.code, host_request(&fixture))
            .await
            .unwrap();

        let err = submit_answer(
            &fixture.state,
            &fixture.code,
            answer(&fixture.bob, 0, 9),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn reveal_twice_is_rejected_and_scores_once() {
        let fixture = fixture().await;
        start_game(&fixture.state, &fixture.code, host_request(&fixture))
            .await
            .unwrap();
        submit_answer(
            &fixture.state,
            &fixture.code,
            answer(&fixture.bob, 0, 1),
        )
        .await
        .unwrap();

        reveal_question(&fixture.state, &fixture.code, host_request(&fixture))
            .await
            .unwrap();
        let err = reveal_question(&fixture.state, &fixture.code, host_request(&fixture))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let room = fixture.state.rooms().read(&fixture.code).unwrap();
        assert_eq!(room.players["Bob"].score, POINTS_PER_CORRECT);
        assert_eq!(room.scored_questions.get(&0), Some(&true));
    }

    #[tokio::test]
    async fn wrong_answer_awards_no_points() {
        let fixture = fixture().await;
        start_game(&fixture.state, &fixture.code, host_request(&fixture))
            .await
            .unwrap();
        submit_answer(
            &fixture.state,
            &fixture.code,
            answer(&fixture.bob, 0, 2),
        )
        .await
        .unwrap();

        let snapshot = reveal_question(&fixture.state, &fixture.code, host_request(&fixture))
            .await
            .unwrap();

        let reveal = snapshot.reveal.unwrap();
        assert_eq!(reveal.correct_index, 1);
        let bob = reveal.awards.iter().find(|a| a.player == "Bob").unwrap();
        assert!(!bob.correct);
        assert_eq!(bob.points, 0);
        assert_eq!(bob.total, 0);

        let room = fixture.state.rooms().read(&fixture.code).unwrap();
        assert_eq!(room.players["Bob"].score, 0);
        assert_eq!(room.scored_questions.get(&0), Some(&true));
    }

    #[tokio::test]
    async fn full_game_runs_to_final_standings() {
        let fixture = fixture().await;
        let snapshot = start_game(&fixture.state, &fixture.code, host_request(&fixture))
            .await
            .unwrap();
        assert_eq!(snapshot.phase, VisibleRoomPhase::Playing);
        assert_eq!(snapshot.current_question, Some(0));
        assert_eq!(snapshot.question_count, 10);

        // Bob answers correctly on even questions only; the host never answers.
        for index in 0..10 {
            let option = if index % 2 == 0 { 1 } else { 0 };
            submit_answer(
                &fixture.state,
                &fixture.code,
                answer(&fixture.bob, index, option),
            )
            .await
            .unwrap();

            let revealed = reveal_question(&fixture.state, &fixture.code, host_request(&fixture))
                .await
                .unwrap();
            assert_eq!(revealed.phase, VisibleRoomPhase::Results);

            let advanced = next_question(&fixture.state, &fixture.code, host_request(&fixture))
                .await
                .unwrap();
            if index < 9 {
                assert_eq!(advanced.phase, VisibleRoomPhase::Playing);
                assert_eq!(advanced.current_question, Some(index + 1));
            } else {
                assert_eq!(advanced.phase, VisibleRoomPhase::Finished);
                assert_eq!(advanced.current_question, Some(9));

                let standings = advanced.standings.unwrap();
                assert_eq!(standings[0].name, "Bob");
                assert_eq!(standings[0].rank, 1);
                assert_eq!(standings[0].score, 5 * POINTS_PER_CORRECT);
                assert_eq!(standings[1].name, "host");
                assert_eq!(standings[1].score, 0);
            }
        }
    }

    #[tokio::test]
    async fn session_for_another_room_is_rejected() {
        let fixture = fixture().await;
        let mut foreign = fixture.host.clone();
        foreign.room_code = "ZZZZZZ".into();

        let err = start_game(&fixture.state, &fixture.code, SessionRequest { session: foreign })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
