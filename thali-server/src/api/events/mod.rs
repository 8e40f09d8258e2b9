//! Change feed over Server-Sent Events
//!
//! Each bus message becomes one SSE event named after its type
//! (`order_event`, `sync`, `notification`) with the message as JSON data.
//! A subscriber that falls behind gets a `resync` event and should call
//! `GET /api/sync`.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::{Stream, StreamExt, future, stream};
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::auth::{CurrentUser, LocationScope};
use crate::core::ServerState;
use crate::message::visible_to;
use crate::utils::AppResult;

const KEEP_ALIVE: Duration = Duration::from_secs(15);

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(subscribe))
}

/// GET /api/events
async fn subscribe(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let scope = LocationScope::for_user(&user, &state.db)?;
    let receiver = state.message_bus.subscribe();
    let shutdown = state.message_bus.shutdown_token().clone();
    tracing::debug!(user_id = user.id, "Change feed subscriber connected");

    let ready = Event::default()
        .event("ready")
        .data(json!({ "epoch": state.orders.epoch() }).to_string());

    let updates = BroadcastStream::new(receiver).filter_map(move |item| {
        future::ready(match item {
            Ok(msg) if visible_to(&msg, &scope) => to_event(&msg),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Change feed subscriber lagged");
                Some(
                    Event::default()
                        .event("resync")
                        .data(json!({ "skipped": skipped }).to_string()),
                )
            }
        })
    });

    let stream = stream::once(future::ready(ready))
        .chain(updates)
        .take_until(shutdown.cancelled_owned())
        .map(Ok);

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE)))
}

fn to_event(msg: &shared::message::BusMessage) -> Option<Event> {
    match serde_json::to_string(msg) {
        Ok(data) => Some(Event::default().event(msg.event_type.to_string()).data(data)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode bus message");
            None
        }
    }
}
