use super::{SqliteRepository, sqlite_connection};
use crate::chat_room::model::{ChatRoom, RoomStatus, RoomUpdate};
use crate::chat_room::repository::ChatRoomRepository;
use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use async_trait::async_trait;
use sqlx::query_as;

#[async_trait]
impl ChatRoomRepository for SqliteRepository {
	async fn get(&self, connection: &mut dyn Connection, room_id: Uuid) -> Result<Option<ChatRoom>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"SELECT id, user_id, user_email, status, admin_id, subject, created_at, updated_at
			FROM chat_rooms
			WHERE id = ?1",
		)
		.bind(room_id)
		.fetch_optional(connection)
		.await
		.map_err(Into::into)
	}

	async fn create(
		&self,
		connection: &mut dyn Connection,
		user_id: Uuid,
		user_email: &str,
		subject: &str,
		created_at: DateTime,
	) -> Result<ChatRoom, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		let id = Uuid::new_v4();
		query_as(
			r"INSERT INTO chat_rooms(id, user_id, user_email, status, admin_id, subject, created_at, updated_at)
			VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?6)
			RETURNING
				id,
				user_id,
				user_email,
				status,
				admin_id,
				subject,
				created_at,
				updated_at",
		)
		.bind(id)
		.bind(user_id)
		.bind(user_email)
		.bind(RoomStatus::Pending)
		.bind(subject)
		.bind(created_at)
		.fetch_one(connection)
		.await
		.map_err(Into::into)
	}

	async fn latest_for_user(
		&self,
		connection: &mut dyn Connection,
		user_id: Uuid,
		status: RoomStatus,
	) -> Result<Option<ChatRoom>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"SELECT id, user_id, user_email, status, admin_id, subject, created_at, updated_at
			FROM chat_rooms
			WHERE user_id = ?1 AND status = ?2
			ORDER BY created_at DESC, rowid DESC
			LIMIT 1",
		)
		.bind(user_id)
		.bind(status)
		.fetch_optional(connection)
		.await
		.map_err(Into::into)
	}

	async fn list_by_recent_update(&self, connection: &mut dyn Connection) -> Result<Vec<ChatRoom>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"SELECT id, user_id, user_email, status, admin_id, subject, created_at, updated_at
			FROM chat_rooms
			ORDER BY updated_at DESC, rowid DESC",
		)
		.fetch_all(connection)
		.await
		.map_err(Into::into)
	}

	async fn update(
		&self,
		connection: &mut dyn Connection,
		room_id: Uuid,
		RoomUpdate {
			status,
			admin_id,
			updated_at,
		}: &RoomUpdate,
	) -> Result<ChatRoom, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"UPDATE chat_rooms
			SET
				status = COALESCE(?1, status),
				admin_id = COALESCE(?2, admin_id),
				updated_at = ?3
			WHERE id = ?4
			RETURNING
				id,
				user_id,
				user_email,
				status,
				admin_id,
				subject,
				created_at,
				updated_at",
		)
		.bind(*status)
		.bind(*admin_id)
		.bind(*updated_at)
		.bind(room_id)
		.fetch_one(connection)
		.await
		.map_err(Into::into)
	}
}
