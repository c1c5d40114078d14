use crate::chat_message::model::{ChatMessage, NewChatMessage, SenderType};
use crate::chat_room::model::{ChatRoom, RoomStatus, RoomUpdate};
use crate::chat_store::ChatStore;
use crate::realtime::{Change, ChangeEvent, ChangeFilter, Subscription, Table};
use crate::support::error::SupportError;
use crate::support::message_list::MessageList;
use crate::support::unread_window::UnreadWindow;
use crate::support::{SentMessage, message_body, update_after_message};
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use crate::utils::time_source::TimeSource;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// A room in the admin's room list together with its unread badge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSummary {
	#[serde(flatten)]
	pub room: ChatRoom,
	pub unread_count: u64,
}

/// A room opened in the console, its messages are all read at this point.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedRoom {
	pub room: ChatRoom,
	pub messages: Vec<ChatMessage>,
	pub marked_read: usize,
}

/// All rooms, most recently updated first, with the unread user messages inside the window.
pub async fn room_summaries(
	store: &ChatStore,
	window: UnreadWindow,
	now: DateTime,
) -> Result<Vec<RoomSummary>, SupportError> {
	let rooms = store.rooms_by_recent_update().await?;
	let unread_counts = store.unread_counts_per_room_since(window.cutoff(now)).await?;

	Ok(rooms
		.into_iter()
		.map(|room| RoomSummary {
			unread_count: unread_counts.get(&room.id).copied().unwrap_or_default(),
			room,
		})
		.collect())
}

/// Marks every unread user message of a room as read and loads its history.
pub async fn acknowledge_room(store: &ChatStore, room_id: Uuid) -> Result<SelectedRoom, SupportError> {
	let room = store.room(room_id).await?.ok_or(SupportError::RoomNotFound(room_id))?;
	let marked_read = store.mark_room_read(room_id).await?.len();
	let messages = store.messages(room_id).await?;
	debug!(%room_id, marked_read, "Acknowledged support room");

	Ok(SelectedRoom {
		room,
		messages,
		marked_read,
	})
}

/// Writes an admin reply, assigns the admin to the room and opens it if it was pending.
pub async fn reply_to_room(
	store: &ChatStore,
	admin_id: Uuid,
	room_id: Uuid,
	body: &str,
	now: DateTime,
) -> Result<SentMessage, SupportError> {
	let body = message_body(body)?;
	let room = store.room(room_id).await?.ok_or(SupportError::RoomNotFound(room_id))?;
	let update = update_after_message(&room, Some(admin_id), now)?;

	let message = store
		.insert_message(&NewChatMessage {
			room_id,
			sender_id: admin_id,
			sender_type: SenderType::Admin,
			message: body.to_string(),
			created_at: now,
		})
		.await?;
	let room = store.update_room(room_id, &update).await?;

	Ok(SentMessage { message, room })
}

/// Moves a room to another status, setting the current status again changes nothing.
pub async fn change_room_status(
	store: &ChatStore,
	room_id: Uuid,
	status: RoomStatus,
	now: DateTime,
) -> Result<ChatRoom, SupportError> {
	let room = store.room(room_id).await?.ok_or(SupportError::RoomNotFound(room_id))?;
	if room.status == status {
		return Ok(room);
	}
	if !room.status.can_transition_to(status) {
		return Err(SupportError::InvalidStatusTransition {
			from: room.status,
			to: status,
		});
	}

	let room = store
		.update_room(
			room_id,
			&RoomUpdate {
				status: Some(status),
				admin_id: None,
				updated_at: now,
			},
		)
		.await?;
	info!(%room_id, %status, "Changed support room status");
	Ok(room)
}

struct Selection {
	room: ChatRoom,
	messages: MessageList,
	incoming: Subscription,
}

/// Admin side of the support chat: the room list with unread badges and one selected conversation.
pub struct AdminConsole {
	store: ChatStore,
	time_source: TimeSource,
	window: UnreadWindow,
	admin_id: Uuid,
	rooms: Vec<RoomSummary>,
	room_changes: Subscription,
	selection: Option<Selection>,
}

impl AdminConsole {
	pub async fn open(
		store: ChatStore,
		time_source: TimeSource,
		window: UnreadWindow,
		admin_id: Uuid,
	) -> Result<Self, SupportError> {
		let room_changes = store.subscribe(ChangeFilter::table(Table::ChatRooms));
		let mut console = Self {
			store,
			time_source,
			window,
			admin_id,
			rooms: Vec::new(),
			room_changes,
			selection: None,
		};
		console.load_rooms().await?;

		Ok(console)
	}

	pub fn rooms(&self) -> &[RoomSummary] {
		&self.rooms
	}

	pub fn unread_count(&self, room_id: Uuid) -> Option<u64> {
		self.rooms
			.iter()
			.find(|summary| summary.room.id == room_id)
			.map(|summary| summary.unread_count)
	}

	pub fn selected_room(&self) -> Option<&ChatRoom> {
		self.selection.as_ref().map(|selection| &selection.room)
	}

	pub fn messages(&self) -> &[ChatMessage] {
		self.selection
			.as_ref()
			.map(|selection| selection.messages.as_slice())
			.unwrap_or_default()
	}

	/// Refetches the complete room list.
	pub async fn load_rooms(&mut self) -> Result<&[RoomSummary], SupportError> {
		self.rooms = room_summaries(&self.store, self.window, self.time_source.now())
			.await
			.inspect_err(|error| error!(%error, "Failed to load support rooms"))?;

		Ok(&self.rooms)
	}

	/// Opens a room: its history is loaded and all of its unread user messages are marked as read.
	pub async fn select_room(&mut self, room_id: Uuid) -> Result<&[ChatMessage], SupportError> {
		let incoming = self.store.subscribe(
			ChangeFilter::table(Table::ChatMessages)
				.event(ChangeEvent::Insert)
				.room(room_id),
		);
		let SelectedRoom { room, messages, .. } = acknowledge_room(&self.store, room_id)
			.await
			.inspect_err(|error| error!(%error, %room_id, "Failed to select support room"))?;

		if let Some(summary) = self.rooms.iter_mut().find(|summary| summary.room.id == room_id) {
			summary.unread_count = 0;
		}
		let selection = self.selection.insert(Selection {
			room,
			messages: messages.into_iter().collect(),
			incoming,
		});

		Ok(selection.messages.as_slice())
	}

	/// Replies in the selected room and appends the reply locally right away.
	pub async fn send_reply(&mut self, body: &str) -> Result<ChatMessage, SupportError> {
		let Some(selection) = self.selection.as_mut() else {
			return Err(SupportError::NoRoomSelected);
		};

		let room_id = selection.room.id;
		let SentMessage { message, room } =
			reply_to_room(&self.store, self.admin_id, room_id, body, self.time_source.now())
				.await
				.inspect_err(|error| error!(%error, %room_id, "Failed to send support reply"))?;

		selection.messages.push(message.clone());
		selection.room = room;
		Ok(message)
	}

	/// Appends a realtime message of the selected room. Returns whether it was new.
	pub fn apply_change(&mut self, change: &Change) -> bool {
		let Some(selection) = self.selection.as_mut() else {
			return false;
		};

		match change.message() {
			Some(message) if message.room_id == selection.room.id => selection.messages.push(message.clone()),
			_ => false,
		}
	}

	/// Waits for the next new message in the selected room.
	pub async fn receive(&mut self) -> Option<ChatMessage> {
		loop {
			let change = self.selection.as_mut()?.incoming.next().await?;
			if self.apply_change(&change) {
				return change.message().cloned();
			}
		}
	}

	/// Waits for any change of the rooms table and refetches the room list.
	///
	/// Returns `None` once the change feed is gone.
	pub async fn wait_for_room_change(&mut self) -> Option<Result<&[RoomSummary], SupportError>> {
		let change = self.room_changes.next().await?;
		if let (Some(selection), Some(room)) = (self.selection.as_mut(), change.room()) {
			if selection.room.id == room.id {
				selection.room = room.clone();
			}
		}

		Some(self.load_rooms().await)
	}
}
