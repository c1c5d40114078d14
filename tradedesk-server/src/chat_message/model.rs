use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
	pub id: Uuid,
	pub room_id: Uuid,
	pub sender_id: Uuid,
	pub sender_type: SenderType,
	pub message: String,
	pub is_read: bool,
	pub created_at: DateTime,
}

#[derive(sqlx::Type, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
	User,
	Admin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewChatMessage {
	pub room_id: Uuid,
	pub sender_id: Uuid,
	pub sender_type: SenderType,
	pub message: String,
	pub created_at: DateTime,
}

impl NewChatMessage {
	/// Only messages written by users await acknowledgement, admin messages are stored read.
	pub fn is_read(&self) -> bool {
		self.sender_type == SenderType::Admin
	}
}
