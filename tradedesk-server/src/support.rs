use crate::chat_message::model::ChatMessage;
use crate::chat_room::model::{ChatRoom, RoomStatus, RoomUpdate};
use crate::support::error::SupportError;
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use serde::{Deserialize, Serialize};

pub mod console;
pub mod error;
pub mod message_list;
pub mod unread_counter;
pub mod unread_window;
pub mod widget;

/// A freshly written message together with the room as it is after the message was sent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentMessage {
	pub message: ChatMessage,
	pub room: ChatRoom,
}

/// Trims a message body and rejects it if nothing is left.
pub fn message_body(body: &str) -> Result<&str, SupportError> {
	let body = body.trim();
	if body.is_empty() {
		return Err(SupportError::EmptyMessage);
	}

	Ok(body)
}

/// The room update that follows a message, the first message of either side opens a pending room.
fn update_after_message(room: &ChatRoom, admin_id: Option<Uuid>, now: DateTime) -> Result<RoomUpdate, SupportError> {
	let status = match room.status {
		RoomStatus::Pending => Some(RoomStatus::Open),
		RoomStatus::Open => None,
		RoomStatus::Closed => return Err(SupportError::RoomClosed(room.id)),
	};

	Ok(RoomUpdate {
		status,
		admin_id,
		updated_at: now,
	})
}
