use crate::chat_message::model::{ChatMessage, NewChatMessage, SenderType};
use crate::chat_room::model::{ChatRoom, RoomStatus};
use crate::chat_store::ChatStore;
use crate::realtime::{Change, ChangeEvent, ChangeFilter, Subscription, Table};
use crate::support::error::SupportError;
use crate::support::message_list::MessageList;
use crate::support::{SentMessage, message_body, update_after_message};
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use crate::utils::time_source::TimeSource;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub const DEFAULT_SUBJECT: &str = "Support Request";

/// The signed in user the widget acts for.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatUser {
	pub id: Uuid,
	pub email: String,
}

/// Finds the user's most recent open room or creates a new pending one.
pub async fn open_room(store: &ChatStore, user: &ChatUser, now: DateTime) -> Result<ChatRoom, SupportError> {
	if let Some(room) = store.latest_room_of_user(user.id, RoomStatus::Open).await? {
		return Ok(room);
	}

	let room = store.create_room(user.id, &user.email, DEFAULT_SUBJECT, now).await?;
	info!(room_id = %room.id, user_id = %user.id, "Opened new support room");
	Ok(room)
}

/// Writes a user message to one of the user's own rooms.
///
/// Sending into a pending room opens it. The message insert and the room update are independent writes,
/// if the room update fails the message stays.
pub async fn send_user_message(
	store: &ChatStore,
	user: &ChatUser,
	room_id: Uuid,
	body: &str,
	now: DateTime,
) -> Result<SentMessage, SupportError> {
	let body = message_body(body)?;
	let room = store
		.room(room_id)
		.await?
		.filter(|room| room.user_id == user.id)
		.ok_or(SupportError::RoomNotFound(room_id))?;
	let update = update_after_message(&room, None, now)?;

	let message = store
		.insert_message(&NewChatMessage {
			room_id,
			sender_id: user.id,
			sender_type: SenderType::User,
			message: body.to_string(),
			created_at: now,
		})
		.await?;
	let room = store.update_room(room_id, &update).await?;

	Ok(SentMessage { message, room })
}

/// User side of a support conversation.
pub struct UserChatWidget {
	store: ChatStore,
	time_source: TimeSource,
	user: ChatUser,
	room: ChatRoom,
	messages: MessageList,
	incoming: Subscription,
}

impl UserChatWidget {
	pub async fn open(store: ChatStore, time_source: TimeSource, user: ChatUser) -> Result<Self, SupportError> {
		let room = open_room(&store, &user, time_source.now())
			.await
			.inspect_err(|error| error!(%error, user_id = %user.id, "Failed to open support room"))?;

		// subscribed before loading the history, overlap is deduplicated
		let incoming = store.subscribe(
			ChangeFilter::table(Table::ChatMessages)
				.event(ChangeEvent::Insert)
				.room(room.id),
		);
		let messages = store
			.messages(room.id)
			.await
			.inspect_err(|error| error!(%error, room_id = %room.id, "Failed to load chat messages"))?
			.into_iter()
			.collect();

		Ok(Self {
			store,
			time_source,
			user,
			room,
			messages,
			incoming,
		})
	}

	pub fn user(&self) -> &ChatUser {
		&self.user
	}

	pub fn room(&self) -> &ChatRoom {
		&self.room
	}

	pub fn messages(&self) -> &[ChatMessage] {
		self.messages.as_slice()
	}

	/// Appends a realtime message written by someone other than the user. Returns whether it was new.
	pub fn apply_change(&mut self, change: &Change) -> bool {
		match change.message() {
			Some(message) if message.room_id == self.room.id && message.sender_id != self.user.id => {
				self.messages.push(message.clone())
			}
			_ => false,
		}
	}

	/// Applies every change that has already been delivered, returns the number of new messages.
	pub fn process_pending_changes(&mut self) -> usize {
		let mut appended = 0;
		while let Some(change) = self.incoming.try_next() {
			if self.apply_change(&change) {
				appended += 1;
			}
		}
		appended
	}

	/// Waits until a new message from the other side arrives, `None` once the change feed is gone.
	pub async fn receive(&mut self) -> Option<ChatMessage> {
		loop {
			let change = self.incoming.next().await?;
			if self.apply_change(&change) {
				return change.message().cloned();
			}
		}
	}

	/// Sends a message and appends it locally right away.
	///
	/// Failures are logged and returned, nothing is queued or retried.
	pub async fn send_message(&mut self, body: &str) -> Result<ChatMessage, SupportError> {
		let now = self.time_source.now();
		let SentMessage { message, room } = send_user_message(&self.store, &self.user, self.room.id, body, now)
			.await
			.inspect_err(|error| error!(%error, room_id = %self.room.id, "Failed to send chat message"))?;

		self.messages.push(message.clone());
		self.room = room;
		Ok(message)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::chat_room::model::RoomUpdate;
	use crate::chat_store::test_utils::chat_store;
	use std::time::Duration;

	#[tokio::test]
	async fn opening_without_an_open_room_should_create_a_pending_room() {
		let store = chat_store().await;
		let user = user();

		let widget = UserChatWidget::open(store.clone(), TimeSource::default(), user.clone())
			.await
			.expect("Failed to open widget");

		assert_eq!(RoomStatus::Pending, widget.room().status);
		assert_eq!(user.id, widget.room().user_id);
		assert_eq!(user.email, widget.room().user_email);
		assert_eq!(DEFAULT_SUBJECT, widget.room().subject);
		assert!(widget.messages().is_empty());
	}

	#[tokio::test]
	async fn opening_should_resume_the_latest_open_room_with_its_history() {
		let store = chat_store().await;
		let user = user();
		let mut first = UserChatWidget::open(store.clone(), TimeSource::default(), user.clone())
			.await
			.expect("Failed to open widget");
		let sent = first.send_message("hello").await.expect("Failed to send");

		let second = UserChatWidget::open(store, TimeSource::default(), user)
			.await
			.expect("Failed to reopen widget");

		assert_eq!(first.room().id, second.room().id);
		assert_eq!(&[sent], second.messages());
	}

	#[tokio::test]
	async fn sending_while_pending_should_insert_once_and_open_the_room_once() {
		let store = chat_store().await;
		let mut widget = UserChatWidget::open(store.clone(), TimeSource::default(), user())
			.await
			.expect("Failed to open widget");
		let mut room_updates = store.subscribe(ChangeFilter::table(Table::ChatRooms).event(ChangeEvent::Update));
		let mut inserts = store.subscribe(ChangeFilter::table(Table::ChatMessages).event(ChangeEvent::Insert));

		let message = widget.send_message("I need help").await.expect("Failed to send");

		let update = room_updates.try_next().expect("Missing room update");
		assert_eq!(Some(RoomStatus::Pending), update.old_room().map(|room| room.status));
		assert_eq!(Some(RoomStatus::Open), update.room().map(|room| room.status));
		assert_eq!(None, room_updates.try_next());

		assert_eq!(Some(Change::inserted(message.clone())), inserts.try_next());
		assert_eq!(None, inserts.try_next());

		assert!(!message.is_read);
		assert_eq!(SenderType::User, message.sender_type);
		assert_eq!(RoomStatus::Open, widget.room().status);
	}

	#[tokio::test]
	async fn sending_while_open_should_only_touch_updated_at() {
		let store = chat_store().await;
		let time_source = TimeSource::test(DateTime::now());
		let mut widget = UserChatWidget::open(store.clone(), time_source.clone(), user())
			.await
			.expect("Failed to open widget");
		widget.send_message("first").await.expect("Failed to send");
		let mut room_updates = store.subscribe(ChangeFilter::table(Table::ChatRooms).event(ChangeEvent::Update));

		time_source.advance_time(Duration::from_secs(60));
		widget.send_message("second").await.expect("Failed to send");

		let update = room_updates.try_next().expect("Missing room update");
		let old = update.old_room().expect("Missing old room");
		let new = update.room().expect("Missing new room");
		assert_eq!(RoomStatus::Open, old.status);
		assert_eq!(RoomStatus::Open, new.status);
		assert_eq!(time_source.now(), new.updated_at);
		assert!(old.updated_at < new.updated_at);
		assert_eq!(None, room_updates.try_next());
	}

	#[tokio::test]
	async fn empty_messages_should_be_rejected_without_writing() {
		let store = chat_store().await;
		let mut widget = UserChatWidget::open(store.clone(), TimeSource::default(), user())
			.await
			.expect("Failed to open widget");
		let mut changes = store.subscribe(ChangeFilter::default());

		let result = widget.send_message("   ").await;

		assert!(matches!(result, Err(SupportError::EmptyMessage)), "{result:?}");
		assert_eq!(None, changes.try_next());
		assert!(widget.messages().is_empty());
	}

	#[tokio::test]
	async fn realtime_echo_of_own_message_should_not_duplicate_it() {
		let store = chat_store().await;
		let mut widget = UserChatWidget::open(store, TimeSource::default(), user())
			.await
			.expect("Failed to open widget");

		let message = widget.send_message("hello").await.expect("Failed to send");
		widget.process_pending_changes();
		widget.apply_change(&Change::inserted(message.clone()));

		assert_eq!(&[message], widget.messages());
	}

	#[tokio::test]
	async fn admin_replies_should_be_received_once() {
		let store = chat_store().await;
		let mut widget = UserChatWidget::open(store.clone(), TimeSource::default(), user())
			.await
			.expect("Failed to open widget");
		widget.send_message("hello").await.expect("Failed to send");

		let reply = store
			.insert_message(&NewChatMessage {
				room_id: widget.room().id,
				sender_id: Uuid::new_v4(),
				sender_type: SenderType::Admin,
				message: "How can I help?".to_string(),
				created_at: DateTime::now(),
			})
			.await
			.expect("Failed to insert reply");

		assert_eq!(Some(reply.clone()), widget.receive().await);
		assert!(!widget.apply_change(&Change::inserted(reply.clone())));
		assert_eq!(2, widget.messages().len());
		assert_eq!(Some(&reply), widget.messages().last());
	}

	#[tokio::test]
	async fn messages_of_other_rooms_should_be_ignored() {
		let store = chat_store().await;
		let mut widget = UserChatWidget::open(store.clone(), TimeSource::default(), user())
			.await
			.expect("Failed to open widget");
		let other_room = store
			.create_room(Uuid::new_v4(), "other@example.com", DEFAULT_SUBJECT, DateTime::now())
			.await
			.expect("Failed to create room");

		store
			.insert_message(&NewChatMessage {
				room_id: other_room.id,
				sender_id: Uuid::new_v4(),
				sender_type: SenderType::Admin,
				message: "Not for you".to_string(),
				created_at: DateTime::now(),
			})
			.await
			.expect("Failed to insert message");

		assert_eq!(0, widget.process_pending_changes());
		assert!(widget.messages().is_empty());
	}

	#[tokio::test]
	async fn sending_into_a_foreign_room_should_fail() {
		let store = chat_store().await;
		let owner = user();
		let room = open_room(&store, &owner, DateTime::now())
			.await
			.expect("Failed to open room");

		let result = send_user_message(&store, &user(), room.id, "hi", DateTime::now()).await;

		assert!(matches!(result, Err(SupportError::RoomNotFound(id)) if id == room.id), "{result:?}");
	}

	#[tokio::test]
	async fn sending_into_a_closed_room_should_fail() {
		let store = chat_store().await;
		let user = user();
		let room = open_room(&store, &user, DateTime::now())
			.await
			.expect("Failed to open room");
		store
			.update_room(
				room.id,
				&RoomUpdate {
					status: Some(RoomStatus::Closed),
					admin_id: None,
					updated_at: DateTime::now(),
				},
			)
			.await
			.expect("Failed to close room");

		let result = send_user_message(&store, &user, room.id, "hi", DateTime::now()).await;

		assert!(matches!(result, Err(SupportError::RoomClosed(_))), "{result:?}");
		assert!(store.messages(room.id).await.expect("Failed to list").is_empty());
	}

	fn user() -> ChatUser {
		ChatUser {
			id: Uuid::new_v4(),
			email: "user@example.com".to_string(),
		}
	}
}
