use crate::chat_message::model::{ChatMessage, NewChatMessage};
use crate::chat_room::model::{ChatRoom, RoomStatus, RoomUpdate};
use crate::database::error::DatabaseError;
use crate::database::{Database, Repository};
use crate::realtime::{Change, ChangeFeed, ChangeFilter, Subscription};
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Chat tables plus their change feed.
///
/// Every mutation is written to the database first and published to the change feed afterwards,
/// one change per affected row. Reads go straight to the database.
#[derive(Clone)]
pub struct ChatStore {
	database: Arc<dyn Database>,
	repository: Arc<dyn Repository>,
	change_feed: ChangeFeed,
}

impl ChatStore {
	pub fn new(database: Arc<dyn Database>, repository: Arc<dyn Repository>, change_feed: ChangeFeed) -> Self {
		Self {
			database,
			repository,
			change_feed,
		}
	}

	pub fn subscribe(&self, filter: ChangeFilter) -> Subscription {
		self.change_feed.subscribe(filter)
	}

	pub async fn room(&self, room_id: Uuid) -> Result<Option<ChatRoom>, DatabaseError> {
		let mut connection = self.database.connection().await?;
		self.repository.chat_room().get(&mut *connection, room_id).await
	}

	pub async fn latest_room_of_user(
		&self,
		user_id: Uuid,
		status: RoomStatus,
	) -> Result<Option<ChatRoom>, DatabaseError> {
		let mut connection = self.database.connection().await?;
		self.repository
			.chat_room()
			.latest_for_user(&mut *connection, user_id, status)
			.await
	}

	pub async fn rooms_by_recent_update(&self) -> Result<Vec<ChatRoom>, DatabaseError> {
		let mut connection = self.database.connection().await?;
		self.repository.chat_room().list_by_recent_update(&mut *connection).await
	}

	pub async fn create_room(
		&self,
		user_id: Uuid,
		user_email: &str,
		subject: &str,
		created_at: DateTime,
	) -> Result<ChatRoom, DatabaseError> {
		let room = {
			let mut connection = self.database.connection().await?;
			self.repository
				.chat_room()
				.create(&mut *connection, user_id, user_email, subject, created_at)
				.await?
		};
		debug!(room_id = %room.id, user_id = %user_id, "Created chat room");

		self.change_feed.publish(Change::inserted(room.clone()));
		Ok(room)
	}

	pub async fn update_room(&self, room_id: Uuid, update: &RoomUpdate) -> Result<ChatRoom, DatabaseError> {
		let (old, new) = {
			let mut connection = self.database.connection().await?;
			let old = self
				.repository
				.chat_room()
				.get(&mut *connection, room_id)
				.await?
				.ok_or_else(|| DatabaseError::NotFound(anyhow!("Chat room {room_id} not found")))?;
			let new = self.repository.chat_room().update(&mut *connection, room_id, update).await?;
			(old, new)
		};
		debug!(room_id = %room_id, status = %new.status, "Updated chat room");

		self.change_feed.publish(Change::updated(old, new.clone()));
		Ok(new)
	}

	pub async fn messages(&self, room_id: Uuid) -> Result<Vec<ChatMessage>, DatabaseError> {
		let mut connection = self.database.connection().await?;
		self.repository.chat_message().list_for_room(&mut *connection, room_id).await
	}

	pub async fn insert_message(&self, message: &NewChatMessage) -> Result<ChatMessage, DatabaseError> {
		let message = {
			let mut connection = self.database.connection().await?;
			self.repository.chat_message().create(&mut *connection, message).await?
		};
		debug!(message_id = %message.id, room_id = %message.room_id, "Inserted chat message");

		self.change_feed.publish(Change::inserted(message.clone()));
		Ok(message)
	}

	pub async fn unread_count_since(&self, since: DateTime) -> Result<u64, DatabaseError> {
		let mut connection = self.database.connection().await?;
		self.repository
			.chat_message()
			.count_unread_since(&mut *connection, since)
			.await
	}

	pub async fn unread_counts_per_room_since(&self, since: DateTime) -> Result<HashMap<Uuid, u64>, DatabaseError> {
		let mut connection = self.database.connection().await?;
		self.repository
			.chat_message()
			.count_unread_per_room_since(&mut *connection, since)
			.await
	}

	pub async fn mark_room_read(&self, room_id: Uuid) -> Result<Vec<ChatMessage>, DatabaseError> {
		let marked = {
			let mut connection = self.database.connection().await?;
			self.repository
				.chat_message()
				.mark_read_in_room(&mut *connection, room_id)
				.await?
		};
		debug!(room_id = %room_id, count = marked.len(), "Marked chat messages as read");

		self.publish_read(&marked);
		Ok(marked)
	}

	pub async fn mark_read_before(&self, cutoff: DateTime) -> Result<Vec<ChatMessage>, DatabaseError> {
		let marked = {
			let mut connection = self.database.connection().await?;
			self.repository
				.chat_message()
				.mark_read_before(&mut *connection, cutoff)
				.await?
		};
		debug!(%cutoff, count = marked.len(), "Marked old chat messages as read");

		self.publish_read(&marked);
		Ok(marked)
	}

	fn publish_read(&self, marked: &[ChatMessage]) {
		for message in marked {
			let unread = ChatMessage {
				is_read: false,
				..message.clone()
			};
			self.change_feed.publish(Change::updated(unread, message.clone()));
		}
	}
}
