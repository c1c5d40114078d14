use crate::chat_room::model::{ChatRoom, RoomStatus, RoomUpdate};
use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use async_trait::async_trait;
use static_assertions::assert_obj_safe;


#[async_trait]
pub trait ChatRoomRepository: Send + Sync + 'static {
	async fn get(&self, connection: &mut dyn Connection, room_id: Uuid) -> Result<Option<ChatRoom>, DatabaseError>;

	/// Creates a new room in the `pending` state.
	async fn create(
		&self,
		connection: &mut dyn Connection,
		user_id: Uuid,
		user_email: &str,
		subject: &str,
		created_at: DateTime,
	) -> Result<ChatRoom, DatabaseError>;

	/// The most recently created room of a user that has the given status.
	async fn latest_for_user(
		&self,
		connection: &mut dyn Connection,
		user_id: Uuid,
		status: RoomStatus,
	) -> Result<Option<ChatRoom>, DatabaseError>;

	/// All rooms, most recently updated first.
	async fn list_by_recent_update(&self, connection: &mut dyn Connection) -> Result<Vec<ChatRoom>, DatabaseError>;

	async fn update(
		&self,
		connection: &mut dyn Connection,
		room_id: Uuid,
		update: &RoomUpdate,
	) -> Result<ChatRoom, DatabaseError>;
}

assert_obj_safe!(ChatRoomRepository);
