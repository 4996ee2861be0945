use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::{
        room::RoomSnapshot,
        sse::{RoomClosedEvent, ServerEvent},
    },
    error::ServiceError,
    services::room_service::room_not_found,
    state::{SharedState, room::Room},
};

const EVENT_ROOM: &str = "room";
const EVENT_ROOM_CLOSED: &str = "room_closed";

/// Subscribe to a room's committed writes.
pub fn subscribe_room(
    state: &SharedState,
    code: &str,
) -> Result<watch::Receiver<Option<Room>>, ServiceError> {
    state
        .rooms()
        .watch(code)
        .ok_or_else(|| room_not_found(code))
}

/// Convert a room subscription into an SSE response.
///
/// The current snapshot is sent immediately, then every committed write in
/// commit order. A `room_closed` event is terminal: the record disappeared
/// and the client should drop its session context and return to mode
/// selection.
pub fn to_sse_stream(
    mut receiver: watch::Receiver<Option<Room>>,
    code: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from the watch channel and pushes into mpsc
    tokio::spawn(async move {
        loop {
            let payload = receiver.borrow_and_update().clone();
            let closed = payload.is_none();

            let event = match &payload {
                Some(room) => {
                    ServerEvent::json(EVENT_ROOM.to_string(), &RoomSnapshot::from(room))
                }
                None => ServerEvent::json(EVENT_ROOM_CLOSED.to_string(), &RoomClosedEvent {
                    code: code.clone(),
                    message: "room closed".into(),
                }),
            };
            match event {
                Ok(payload) => {
                    if tx.send(Ok(build_event(payload))).await.is_err() {
                        break;
                    }
                }
                Err(err) => warn!(%code, error = %err, "failed to serialize room event"),
            }

            if closed {
                break;
            }

            tokio::select! {
                _ = tx.closed() => break,
                changed = receiver.changed() => {
                    if changed.is_err() {
                        // Channel closed without a final None: synthesize the
                        // closure event so the client still learns about it.
                        if let Ok(payload) = ServerEvent::json(
                            EVENT_ROOM_CLOSED.to_string(),
                            &RoomClosedEvent {
                                code: code.clone(),
                                message: "room closed".into(),
                            },
                        ) {
                            let _ = tx.send(Ok(build_event(payload))).await;
                        }
                        break;
                    }
                }
            }
        }

        info!(%code, "room SSE stream disconnected");
    });

    // response stream reads from mpsc; when the client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn build_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}
