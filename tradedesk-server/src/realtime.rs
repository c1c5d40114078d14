pub mod change;
pub mod subscription;

pub use change::{Change, ChangeEvent, Record, Table};
pub use subscription::{ChangeFilter, Subscription};

use tokio::sync::broadcast;
use tracing::trace;

/// In-process feed of the committed row mutations of the chat tables.
///
/// A subscriber that falls behind by more than the channel capacity skips the changes it missed and has to
/// refetch when it needs a consistent view.
#[derive(Clone)]
pub struct ChangeFeed {
	sender: broadcast::Sender<Change>,
}

impl ChangeFeed {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity.max(1));
		Self { sender }
	}

	pub fn publish(&self, change: Change) {
		trace!(event = ?change.event, table = ?change.table, "Publishing change");
		// nobody listening is fine
		let _ = self.sender.send(change);
	}

	pub fn subscribe(&self, filter: ChangeFilter) -> Subscription {
		Subscription::new(self.sender.subscribe(), filter)
	}
}

impl Default for ChangeFeed {
	fn default() -> Self {
		const DEFAULT_CAPACITY: usize = 256;
		Self::new(DEFAULT_CAPACITY)
	}
}
