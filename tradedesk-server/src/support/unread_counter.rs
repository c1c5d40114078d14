use crate::chat_store::ChatStore;
use crate::realtime::{ChangeFilter, Subscription, Table};
use crate::support::error::SupportError;
use crate::support::unread_window::UnreadWindow;
use crate::types::date_time::DateTime;
use crate::utils::time_source::TimeSource;
use tracing::{error, info};

/// Number of unread user messages across all rooms inside the window.
pub async fn unread_count(store: &ChatStore, window: UnreadWindow, now: DateTime) -> Result<u64, SupportError> {
	Ok(store.unread_count_since(window.cutoff(now)).await?)
}

/// Marks unread user messages older than the window as read, returns how many were marked.
pub async fn mark_old_messages_read(
	store: &ChatStore,
	window: UnreadWindow,
	now: DateTime,
) -> Result<usize, SupportError> {
	let marked = store.mark_read_before(window.cutoff(now)).await?.len();
	if marked > 0 {
		info!(marked, "Marked stale chat messages as read");
	}

	Ok(marked)
}

/// Global unread badge of the admin dashboard.
///
/// The count is recomputed from scratch on every change of the messages table.
pub struct UnreadCounter {
	store: ChatStore,
	time_source: TimeSource,
	window: UnreadWindow,
	count: u64,
	changes: Subscription,
}

impl UnreadCounter {
	/// Clears stale unread messages once and computes the initial count.
	///
	/// A failed cleanup is logged, the count is computed regardless.
	pub async fn mount(store: ChatStore, time_source: TimeSource, window: UnreadWindow) -> Result<Self, SupportError> {
		let changes = store.subscribe(ChangeFilter::table(Table::ChatMessages));
		let mut counter = Self {
			store,
			time_source,
			window,
			count: 0,
			changes,
		};
		let now = counter.time_source.now();
		if let Err(error) = mark_old_messages_read(&counter.store, counter.window, now).await {
			error!(%error, "Failed to mark stale chat messages as read, counting anyway");
		}
		counter.refresh().await?;

		Ok(counter)
	}

	pub fn count(&self) -> u64 {
		self.count
	}

	pub async fn refresh(&mut self) -> Result<u64, SupportError> {
		self.count = unread_count(&self.store, self.window, self.time_source.now())
			.await
			.inspect_err(|error| error!(%error, "Failed to count unread chat messages"))?;

		Ok(self.count)
	}

	/// Waits for the next change of the messages table and recomputes the count.
	///
	/// Returns `None` once the change feed is gone.
	pub async fn wait_for_change(&mut self) -> Option<Result<u64, SupportError>> {
		self.changes.next().await?;
		Some(self.refresh().await)
	}

	pub async fn mark_all_old_messages_as_read(&mut self) -> Result<u64, SupportError> {
		mark_old_messages_read(&self.store, self.window, self.time_source.now())
			.await
			.inspect_err(|error| error!(%error, "Failed to mark stale chat messages as read"))?;

		self.refresh().await
	}
}
