use crate::realtime::change::{Change, ChangeEvent, Table};
use crate::types::uuid::Uuid;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::warn;

/// Column predicate of a subscription, unset fields match everything.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ChangeFilter {
	pub table: Option<Table>,
	pub event: Option<ChangeEvent>,
	pub room_id: Option<Uuid>,
}

impl ChangeFilter {
	pub fn table(table: Table) -> Self {
		Self {
			table: Some(table),
			..Self::default()
		}
	}

	#[must_use]
	pub fn event(self, event: ChangeEvent) -> Self {
		Self {
			event: Some(event),
			..self
		}
	}

	#[must_use]
	pub fn room(self, room_id: Uuid) -> Self {
		Self {
			room_id: Some(room_id),
			..self
		}
	}

	pub fn matches(&self, change: &Change) -> bool {
		self.table.is_none_or(|table| table == change.table)
			&& self.event.is_none_or(|event| event == change.event)
			&& self.room_id.is_none_or(|room_id| room_id == change.new.room_id())
	}
}

pub struct Subscription {
	receiver: broadcast::Receiver<Change>,
	filter: ChangeFilter,
}

impl Subscription {
	pub(super) fn new(receiver: broadcast::Receiver<Change>, filter: ChangeFilter) -> Self {
		Self { receiver, filter }
	}

	pub fn filter(&self) -> ChangeFilter {
		self.filter
	}

	/// Waits for the next matching change, `None` once the feed is gone.
	pub async fn next(&mut self) -> Option<Change> {
		loop {
			match self.receiver.recv().await {
				Ok(change) if self.filter.matches(&change) => return Some(change),
				Ok(_) => {}
				Err(RecvError::Lagged(skipped)) => {
					warn!(skipped, filter = ?self.filter, "Subscriber lagged behind the change feed");
				}
				Err(RecvError::Closed) => return None,
			}
		}
	}

	/// Returns the next matching change if one is already queued.
	pub fn try_next(&mut self) -> Option<Change> {
		use broadcast::error::TryRecvError;
		loop {
			match self.receiver.try_recv() {
				Ok(change) if self.filter.matches(&change) => return Some(change),
				Ok(_) => {}
				Err(TryRecvError::Lagged(skipped)) => {
					warn!(skipped, filter = ?self.filter, "Subscriber lagged behind the change feed");
				}
				Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
			}
		}
	}

	pub fn into_stream(self) -> impl Stream<Item = Change> + Send + 'static {
		let filter = self.filter;
		BroadcastStream::new(self.receiver).filter_map(move |result| {
			let change = match result {
				Ok(change) => filter.matches(&change).then_some(change),
				Err(BroadcastStreamRecvError::Lagged(skipped)) => {
					warn!(skipped, ?filter, "Subscriber lagged behind the change feed");
					None
				}
			};
			std::future::ready(change)
		})
	}
}
