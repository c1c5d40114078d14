use crate::chat_message::model::ChatMessage;
use crate::types::uuid::Uuid;
use std::collections::HashSet;

/// Local, ordered copy of a room's messages.
///
/// Messages reach the list from several paths (initial load, optimistic append after sending and realtime
/// delivery), so every message is kept at most once, identified by its id.
#[derive(Clone, Debug, Default)]
pub struct MessageList {
	messages: Vec<ChatMessage>,
	ids: HashSet<Uuid>,
}

impl MessageList {
	/// Appends a message unless one with the same id is already present.
	pub fn push(&mut self, message: ChatMessage) -> bool {
		if !self.ids.insert(message.id) {
			return false;
		}

		self.messages.push(message);
		true
	}

	pub fn as_slice(&self) -> &[ChatMessage] {
		&self.messages
	}
}

impl FromIterator<ChatMessage> for MessageList {
	fn from_iter<I: IntoIterator<Item = ChatMessage>>(iterator: I) -> Self {
		let mut list = Self::default();
		for message in iterator {
			list.push(message);
		}
		list
	}
}

impl From<MessageList> for Vec<ChatMessage> {
	fn from(list: MessageList) -> Self {
		list.messages
	}
}
