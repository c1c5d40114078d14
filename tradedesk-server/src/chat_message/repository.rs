use crate::chat_message::model::{ChatMessage, NewChatMessage};
use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use async_trait::async_trait;
use static_assertions::assert_obj_safe;
use std::collections::HashMap;


#[async_trait]
pub trait ChatMessageRepository: Send + Sync + 'static {
	async fn create(
		&self,
		connection: &mut dyn Connection,
		message: &NewChatMessage,
	) -> Result<ChatMessage, DatabaseError>;

	/// Messages of a room in the order they were written.
	async fn list_for_room(
		&self,
		connection: &mut dyn Connection,
		room_id: Uuid,
	) -> Result<Vec<ChatMessage>, DatabaseError>;

	/// Number of unread user messages written at or after `since`, across all rooms.
	async fn count_unread_since(&self, connection: &mut dyn Connection, since: DateTime) -> Result<u64, DatabaseError>;

	/// Number of unread user messages written at or after `since`, per room.
	/// Rooms without any are absent from the map.
	async fn count_unread_per_room_since(
		&self,
		connection: &mut dyn Connection,
		since: DateTime,
	) -> Result<HashMap<Uuid, u64>, DatabaseError>;

	/// Marks every unread user message of a room as read and returns the changed messages.
	async fn mark_read_in_room(
		&self,
		connection: &mut dyn Connection,
		room_id: Uuid,
	) -> Result<Vec<ChatMessage>, DatabaseError>;

	/// Marks every unread user message written before `cutoff` as read and returns the changed messages.
	async fn mark_read_before(
		&self,
		connection: &mut dyn Connection,
		cutoff: DateTime,
	) -> Result<Vec<ChatMessage>, DatabaseError>;
}

assert_obj_safe!(ChatMessageRepository);
