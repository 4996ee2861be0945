use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quiz Live Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::categories::list_categories,
        crate::routes::rooms::create_room,
        crate::routes::rooms::get_room,
        crate::routes::rooms::join_room,
        crate::routes::rooms::leave_room,
        crate::routes::rooms::start_game,
        crate::routes::rooms::submit_answer,
        crate::routes::rooms::reveal_question,
        crate::routes::rooms::next_question,
        crate::routes::sse::room_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::categories::CategoriesResponse,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::JoinRoomRequest,
            crate::dto::room::SessionRequest,
            crate::dto::room::AnswerRequest,
            crate::dto::room::SessionContext,
            crate::dto::room::RoomCreatedResponse,
            crate::dto::room::JoinedResponse,
            crate::dto::room::ActionResponse,
            crate::dto::room::RoomSnapshot,
            crate::dto::room::PlayerSummary,
            crate::dto::room::QuestionView,
            crate::dto::room::RevealView,
            crate::dto::room::AwardView,
            crate::dto::room::StandingEntry,
            crate::dto::phase::VisibleRoomPhase,
            crate::dto::sse::RoomClosedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "categories", description = "Question category listing"),
        (name = "rooms", description = "Room lifecycle and gameplay operations"),
        (name = "sse", description = "Server-sent room snapshot streams"),
    )
)]
pub struct ApiDoc;
