use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{Display, Formatter};

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatRoom {
	pub id: Uuid,
	pub user_id: Uuid,
	pub user_email: String,
	pub status: RoomStatus,
	pub admin_id: Option<Uuid>,
	pub subject: String,
	pub created_at: DateTime,
	pub updated_at: DateTime,
}

/// Lifecycle of a support conversation.
///
/// A room starts out `Pending` when the user first opens the chat and becomes `Open`
/// with the first message sent by either side. `Closed` is terminal.
#[derive(sqlx::Type, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
	Pending,
	Open,
	Closed,
}

impl RoomStatus {
	pub fn can_transition_to(self, next: RoomStatus) -> bool {
		use RoomStatus::*;
		match (self, next) {
			(Pending, _) | (Open, Open | Closed) | (Closed, Closed) => true,
			(Open, Pending) | (Closed, Pending | Open) => false,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			RoomStatus::Pending => "pending",
			RoomStatus::Open => "open",
			RoomStatus::Closed => "closed",
		}
	}
}

impl Display for RoomStatus {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		formatter.write_str(self.as_str())
	}
}

/// Partial update of a room, fields set to `None` keep their stored value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomUpdate {
	pub status: Option<RoomStatus>,
	pub admin_id: Option<Uuid>,
	pub updated_at: DateTime,
}

impl RoomUpdate {
	pub fn touch(updated_at: DateTime) -> Self {
		Self {
			status: None,
			admin_id: None,
			updated_at,
		}
	}
}
