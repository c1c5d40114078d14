use crate::chat_room::model::RoomStatus;
use crate::database::error::DatabaseError;
use crate::types::uuid::Uuid;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupportError {
	#[error("Chat messages must not be empty!")]
	EmptyMessage,
	#[error("Chat room {0} not found.")]
	RoomNotFound(Uuid),
	#[error("Chat room {0} is closed.")]
	RoomClosed(Uuid),
	#[error("No chat room selected.")]
	NoRoomSelected,
	#[error("Chat room can't change from '{from}' to '{to}'.")]
	InvalidStatusTransition { from: RoomStatus, to: RoomStatus },
	#[error("Chat store failed: {0}")]
	Store(#[from] DatabaseError),
}
