use crate::chat_message::model::ChatMessage;
use crate::chat_room::model::ChatRoom;
use crate::types::uuid::Uuid;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeEvent {
	Insert,
	Update,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Table {
	ChatRooms,
	ChatMessages,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Record {
	Room(ChatRoom),
	Message(ChatMessage),
}

impl Record {
	pub fn table(&self) -> Table {
		match self {
			Record::Room(_) => Table::ChatRooms,
			Record::Message(_) => Table::ChatMessages,
		}
	}

	/// The room a record belongs to, for rooms this is their own id.
	pub fn room_id(&self) -> Uuid {
		match self {
			Record::Room(room) => room.id,
			Record::Message(message) => message.room_id,
		}
	}
}

/// A single row mutation, shaped like the change payloads of the hosted chat store.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Change {
	pub event: ChangeEvent,
	pub table: Table,
	pub new: Record,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub old: Option<Record>,
}

impl Change {
	pub fn inserted(record: impl Into<Record>) -> Self {
		let new = record.into();
		Self {
			event: ChangeEvent::Insert,
			table: new.table(),
			new,
			old: None,
		}
	}

	pub fn updated<R: Into<Record>>(old: R, new: R) -> Self {
		let new = new.into();
		Self {
			event: ChangeEvent::Update,
			table: new.table(),
			new,
			old: Some(old.into()),
		}
	}

	pub fn message(&self) -> Option<&ChatMessage> {
		match &self.new {
			Record::Message(message) => Some(message),
			Record::Room(_) => None,
		}
	}

	pub fn room(&self) -> Option<&ChatRoom> {
		match &self.new {
			Record::Room(room) => Some(room),
			Record::Message(_) => None,
		}
	}

	pub fn old_room(&self) -> Option<&ChatRoom> {
		match &self.old {
			Some(Record::Room(room)) => Some(room),
			_ => None,
		}
	}
}

impl From<ChatRoom> for Record {
	fn from(room: ChatRoom) -> Self {
		Record::Room(room)
	}
}

impl From<ChatMessage> for Record {
	fn from(message: ChatMessage) -> Self {
		Record::Message(message)
	}
}
