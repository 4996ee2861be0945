use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        room::{
            ActionResponse, AnswerRequest, CreateRoomRequest, JoinRoomRequest, JoinedResponse,
            RoomCreatedResponse, RoomSnapshot, SessionRequest,
        },
        validation::validate_room_code,
    },
    error::AppError,
    services::{play_service, room_service},
    state::SharedState,
};

/// Routes covering the room lifecycle and gameplay operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}", get(get_room))
        .route("/rooms/{code}/join", post(join_room))
        .route("/rooms/{code}/leave", post(leave_room))
        .route("/rooms/{code}/start", post(start_game))
        .route("/rooms/{code}/answers", post(submit_answer))
        .route("/rooms/{code}/reveal", post(reveal_question))
        .route("/rooms/{code}/next", post(next_question))
}

#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created", body = RoomCreatedResponse),
        (status = 503, description = "Question bank unavailable")
    )
)]
/// Create a room and seat the caller as its host.
pub async fn create_room(
    State(state): State<SharedState>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<Json<RoomCreatedResponse>, AppError> {
    payload.validate()?;
    let response = room_service::create_room(&state, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/rooms/{code}",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "Current room snapshot", body = RoomSnapshot),
        (status = 404, description = "Room not found")
    )
)]
/// Read the current snapshot of a room.
pub async fn get_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let code = checked_code(code)?;
    let snapshot = room_service::room_snapshot(&state, &code)?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/rooms/{code}/join",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Joined the room", body = JoinedResponse),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Game already started")
    )
)]
/// Join a waiting room under a display name.
pub async fn join_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<JoinedResponse>, AppError> {
    let code = checked_code(code)?;
    payload.validate()?;
    let response = room_service::join_room(&state, &code, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/rooms/{code}/leave",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = SessionRequest,
    responses((status = 200, description = "Left the room", body = ActionResponse))
)]
/// Leave a room, removing the caller's player record.
pub async fn leave_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let code = checked_code(code)?;
    payload.validate()?;
    let response = room_service::leave_room(&state, &code, &payload.session).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/rooms/{code}/start",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Game started", body = RoomSnapshot),
        (status = 401, description = "Caller is not the host"),
        (status = 409, description = "Room is not waiting")
    )
)]
/// Start the game. Host only.
pub async fn start_game(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let code = checked_code(code)?;
    payload.validate()?;
    let snapshot = play_service::start_game(&state, &code, payload).await?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/rooms/{code}/answers",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = RoomSnapshot),
        (status = 409, description = "No question is open")
    )
)]
/// Submit an answer for the currently open question.
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let code = checked_code(code)?;
    payload.validate()?;
    let snapshot = play_service::submit_answer(&state, &code, payload).await?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/rooms/{code}/reveal",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Answer revealed and question scored", body = RoomSnapshot),
        (status = 401, description = "Caller is not the host"),
        (status = 409, description = "No question is open")
    )
)]
/// Reveal the open question's answer and score it. Host only.
pub async fn reveal_question(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let code = checked_code(code)?;
    payload.validate()?;
    let snapshot = play_service::reveal_question(&state, &code, payload).await?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/rooms/{code}/next",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Advanced to the next question or finished", body = RoomSnapshot),
        (status = 401, description = "Caller is not the host"),
        (status = 409, description = "Room is not showing results")
    )
)]
/// Advance to the next question or finish the game. Host only.
pub async fn next_question(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let code = checked_code(code)?;
    payload.validate()?;
    let snapshot = play_service::next_question(&state, &code, payload).await?;
    Ok(Json(snapshot))
}

/// Validate a room code path parameter before it reaches the service layer.
fn checked_code(code: String) -> Result<String, AppError> {
    validate_room_code(&code)
        .map_err(|err| AppError::BadRequest(format!("invalid room code: {err}")))?;
    Ok(code)
}
