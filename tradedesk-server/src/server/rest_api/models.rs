use crate::chat_message::model::ChatMessage;
use crate::chat_room::model::{ChatRoom, RoomStatus};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct MessageRequest {
	pub message: String,
}

#[derive(Deserialize)]
pub struct StatusRequest {
	pub status: RoomStatus,
}

#[derive(Serialize)]
pub struct RoomWithMessages {
	pub room: ChatRoom,
	pub messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
	pub count: u64,
}

#[derive(Serialize)]
pub struct MarkOldReadResponse {
	pub marked: usize,
	pub count: u64,
}
