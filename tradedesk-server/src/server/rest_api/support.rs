use crate::backend::ApiResponse;
use crate::chat_store::ChatStore;
use crate::server::rest_api::error::ApiErrorResponse;
use crate::server::rest_api::extract::{Json, Path};
use crate::server::rest_api::identity::UserIdentity;
use crate::server::rest_api::models::{MessageRequest, RoomWithMessages};
use crate::server::rest_api::response::Created;
use crate::support::SentMessage;
use crate::support::widget;
use crate::types::uuid::Uuid;
use crate::utils::time_source::TimeSource;
use axum::extract::State;

pub async fn open_room(
	State(chat_store): State<ChatStore>,
	State(time_source): State<TimeSource>,
	UserIdentity(user): UserIdentity,
) -> Result<ApiResponse<RoomWithMessages>, ApiErrorResponse> {
	let room = widget::open_room(&chat_store, &user, time_source.now()).await?;
	let messages = chat_store.messages(room.id).await?;

	Ok(ApiResponse::success(RoomWithMessages { room, messages }))
}

pub async fn send_message(
	State(chat_store): State<ChatStore>,
	State(time_source): State<TimeSource>,
	UserIdentity(user): UserIdentity,
	Path(room_id): Path<Uuid>,
	Json(request): Json<MessageRequest>,
) -> Result<Created<ApiResponse<SentMessage>>, ApiErrorResponse> {
	let sent = widget::send_user_message(&chat_store, &user, room_id, &request.message, time_source.now()).await?;

	Ok(Created(ApiResponse::success(sent)))
}
