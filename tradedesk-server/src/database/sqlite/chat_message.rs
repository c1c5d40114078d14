use super::{SqliteRepository, sqlite_connection};
use crate::chat_message::model::{ChatMessage, NewChatMessage, SenderType};
use crate::chat_message::repository::ChatMessageRepository;
use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{query_as, query_scalar};
use std::collections::HashMap;

#[async_trait]
impl ChatMessageRepository for SqliteRepository {
	async fn create(
		&self,
		connection: &mut dyn Connection,
		message: &NewChatMessage,
	) -> Result<ChatMessage, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		let id = Uuid::new_v4();
		query_as(
			r"INSERT INTO chat_messages(id, room_id, sender_id, sender_type, message, is_read, created_at)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
			RETURNING
				id,
				room_id,
				sender_id,
				sender_type,
				message,
				is_read,
				created_at",
		)
		.bind(id)
		.bind(message.room_id)
		.bind(message.sender_id)
		.bind(message.sender_type)
		.bind(&message.message)
		.bind(message.is_read())
		.bind(message.created_at)
		.fetch_one(connection)
		.await
		.map_err(Into::into)
	}

	async fn list_for_room(
		&self,
		connection: &mut dyn Connection,
		room_id: Uuid,
	) -> Result<Vec<ChatMessage>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"SELECT id, room_id, sender_id, sender_type, message, is_read, created_at
			FROM chat_messages
			WHERE room_id = ?1
			ORDER BY created_at ASC, rowid ASC",
		)
		.bind(room_id)
		.fetch_all(connection)
		.await
		.map_err(Into::into)
	}

	async fn count_unread_since(&self, connection: &mut dyn Connection, since: DateTime) -> Result<u64, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		let count: i64 = query_scalar(
			r"SELECT COUNT(*)
			FROM chat_messages
			WHERE sender_type = ?1 AND is_read = FALSE AND created_at >= ?2",
		)
		.bind(SenderType::User)
		.bind(since)
		.fetch_one(connection)
		.await?;

		u64::try_from(count).map_err(|error| DatabaseError::Decode(anyhow!(error)))
	}

	async fn count_unread_per_room_since(
		&self,
		connection: &mut dyn Connection,
		since: DateTime,
	) -> Result<HashMap<Uuid, u64>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		let counts: Vec<(Uuid, i64)> = query_as(
			r"SELECT room_id, COUNT(*)
			FROM chat_messages
			WHERE sender_type = ?1 AND is_read = FALSE AND created_at >= ?2
			GROUP BY room_id",
		)
		.bind(SenderType::User)
		.bind(since)
		.fetch_all(connection)
		.await?;

		counts
			.into_iter()
			.map(|(room_id, count)| {
				u64::try_from(count)
					.map(|count| (room_id, count))
					.map_err(|error| DatabaseError::Decode(anyhow!(error)))
			})
			.collect()
	}

	async fn mark_read_in_room(
		&self,
		connection: &mut dyn Connection,
		room_id: Uuid,
	) -> Result<Vec<ChatMessage>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"UPDATE chat_messages
			SET is_read = TRUE
			WHERE room_id = ?1 AND sender_type = ?2 AND is_read = FALSE
			RETURNING
				id,
				room_id,
				sender_id,
				sender_type,
				message,
				is_read,
				created_at",
		)
		.bind(room_id)
		.bind(SenderType::User)
		.fetch_all(connection)
		.await
		.map_err(Into::into)
	}

	async fn mark_read_before(
		&self,
		connection: &mut dyn Connection,
		cutoff: DateTime,
	) -> Result<Vec<ChatMessage>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"UPDATE chat_messages
			SET is_read = TRUE
			WHERE sender_type = ?1 AND is_read = FALSE AND created_at < ?2
			RETURNING
				id,
				room_id,
				sender_id,
				sender_type,
				message,
				is_read,
				created_at",
		)
		.bind(SenderType::User)
		.bind(cutoff)
		.fetch_all(connection)
		.await
		.map_err(Into::into)
	}
}
