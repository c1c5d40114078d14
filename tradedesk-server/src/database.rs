use crate::chat_message::repository::ChatMessageRepository;
use crate::chat_room::repository::ChatRoomRepository;
use crate::database::error::DatabaseError;
use async_trait::async_trait;
use static_assertions::assert_obj_safe;
use std::any::{Any, type_name};

pub mod error;
pub mod sqlite;

#[async_trait]
pub trait Database: Send + Sync {
	async fn migrate(&self) -> Result<(), DatabaseError>;

	async fn connection(&self) -> Result<Box<dyn Connection>, DatabaseError>;
}

assert_obj_safe!(Database);

pub trait Connection: Any + Send + Sync {
	fn type_name(&self) -> &'static str {
		type_name::<Self>()
	}
}

assert_obj_safe!(Connection);

pub trait Repository: ChatRoomRepository + ChatMessageRepository + Send + Sync + 'static {
	fn chat_room(&self) -> &dyn ChatRoomRepository;
	fn chat_message(&self) -> &dyn ChatMessageRepository;
}

assert_obj_safe!(Repository);
