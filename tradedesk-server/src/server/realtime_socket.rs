use crate::chat_store::ChatStore;
use crate::realtime::{Change, ChangeFilter, Subscription};
use crate::server::rest_api::error::ApiErrorResponse;
use crate::server::rest_api::extract::Query;
use crate::server::rest_api::identity::Viewer;
use crate::support::error::SupportError;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use std::pin::pin;
use tracing::{debug, error, info};

/// Streams the changes matching the query's filter as JSON text messages.
///
/// Admins may watch everything. Users have to scope the filter to one of their own rooms.
pub async fn realtime_changes(
	State(chat_store): State<ChatStore>,
	viewer: Viewer,
	Query(filter): Query<ChangeFilter>,
	websocket: WebSocketUpgrade,
) -> Result<Response, ApiErrorResponse> {
	if let Viewer::User(user) = &viewer {
		let Some(room_id) = filter.room_id else {
			return Err(ApiErrorResponse::new(
				axum::http::StatusCode::FORBIDDEN,
				"Users can only watch their own rooms.",
			));
		};
		chat_store
			.room(room_id)
			.await?
			.filter(|room| room.user_id == user.id)
			.ok_or(SupportError::RoomNotFound(room_id))?;
	}

	// subscribed before the upgrade, nothing written in between is lost
	let subscription = chat_store.subscribe(filter);
	Ok(websocket.on_upgrade(move |socket| forward_changes(socket, subscription)))
}

async fn forward_changes(socket: WebSocket, subscription: Subscription) {
	let filter = subscription.filter();
	info!(?filter, "Realtime subscriber connected");

	let (mut sink, mut stream) = socket.split();
	let mut changes = pin!(subscription.into_stream());
	loop {
		tokio::select! {
			change = changes.next() => {
				let Some(change) = change else {
					break;
				};
				let Some(json) = change_json(&change) else {
					continue;
				};
				if let Err(error) = sink.send(Message::Text(json.into())).await {
					debug!(%error, "Failed to send change to realtime subscriber");
					break;
				}
			}
			message = stream.next() => match message {
				Some(Ok(Message::Close(_)) | Err(_)) | None => break,
				Some(Ok(_)) => {}
			}
		}
	}

	info!(?filter, "Realtime subscriber disconnected");
}

fn change_json(change: &Change) -> Option<String> {
	serde_json::to_string(change)
		.inspect_err(|error| error!(%error, "Failed to serialize change"))
		.ok()
}
