use crate::backend::ApiResponse;
use crate::chat_room::model::ChatRoom;
use crate::chat_store::ChatStore;
use crate::server::rest_api::error::ApiErrorResponse;
use crate::server::rest_api::extract::{Json, Path};
use crate::server::rest_api::identity::AdminIdentity;
use crate::server::rest_api::models::{MarkOldReadResponse, MessageRequest, StatusRequest, UnreadCountResponse};
use crate::server::rest_api::response::Created;
use crate::support::SentMessage;
use crate::support::console::{self, RoomSummary, SelectedRoom};
use crate::support::unread_counter;
use crate::support::unread_window::UnreadWindow;
use crate::types::uuid::Uuid;
use crate::utils::time_source::TimeSource;
use axum::extract::State;

pub async fn list_rooms(
	State(chat_store): State<ChatStore>,
	State(time_source): State<TimeSource>,
	State(unread_window): State<UnreadWindow>,
	_admin: AdminIdentity,
) -> Result<ApiResponse<Vec<RoomSummary>>, ApiErrorResponse> {
	let rooms = console::room_summaries(&chat_store, unread_window, time_source.now()).await?;
	Ok(ApiResponse::success(rooms))
}

pub async fn select_room(
	State(chat_store): State<ChatStore>,
	_admin: AdminIdentity,
	Path(room_id): Path<Uuid>,
) -> Result<ApiResponse<SelectedRoom>, ApiErrorResponse> {
	let selected = console::acknowledge_room(&chat_store, room_id).await?;
	Ok(ApiResponse::success(selected))
}

pub async fn send_reply(
	State(chat_store): State<ChatStore>,
	State(time_source): State<TimeSource>,
	AdminIdentity(admin_id): AdminIdentity,
	Path(room_id): Path<Uuid>,
	Json(request): Json<MessageRequest>,
) -> Result<Created<ApiResponse<SentMessage>>, ApiErrorResponse> {
	let sent = console::reply_to_room(&chat_store, admin_id, room_id, &request.message, time_source.now()).await?;
	Ok(Created(ApiResponse::success(sent)))
}

pub async fn change_status(
	State(chat_store): State<ChatStore>,
	State(time_source): State<TimeSource>,
	_admin: AdminIdentity,
	Path(room_id): Path<Uuid>,
	Json(request): Json<StatusRequest>,
) -> Result<ApiResponse<ChatRoom>, ApiErrorResponse> {
	let room = console::change_room_status(&chat_store, room_id, request.status, time_source.now()).await?;
	Ok(ApiResponse::success(room))
}

pub async fn unread_count(
	State(chat_store): State<ChatStore>,
	State(time_source): State<TimeSource>,
	State(unread_window): State<UnreadWindow>,
	_admin: AdminIdentity,
) -> Result<ApiResponse<UnreadCountResponse>, ApiErrorResponse> {
	let count = unread_counter::unread_count(&chat_store, unread_window, time_source.now()).await?;
	Ok(ApiResponse::success(UnreadCountResponse { count }))
}

pub async fn mark_old_messages_read(
	State(chat_store): State<ChatStore>,
	State(time_source): State<TimeSource>,
	State(unread_window): State<UnreadWindow>,
	_admin: AdminIdentity,
) -> Result<ApiResponse<MarkOldReadResponse>, ApiErrorResponse> {
	let now = time_source.now();
	let marked = unread_counter::mark_old_messages_read(&chat_store, unread_window, now).await?;
	let count = unread_counter::unread_count(&chat_store, unread_window, now).await?;

	Ok(ApiResponse::success(MarkOldReadResponse { marked, count }).with_message(format!(
		"Marked {marked} old messages as read."
	)))
}
