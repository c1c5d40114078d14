use crate::types::date_time::DateTime;
use chrono::TimeDelta;
use std::time::Duration;

/// Trailing time window in which unread user messages count towards unread badges.
///
/// Unread messages older than the window are considered stale, they are excluded from every count and get
/// marked as read in bulk when the unread counter mounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnreadWindow(Duration);

impl UnreadWindow {
	pub const DEFAULT: UnreadWindow = UnreadWindow(Duration::from_secs(7 * 24 * 60 * 60));

	pub fn new(duration: Duration) -> Self {
		Self(duration)
	}

	/// Earliest creation time of a message that is still inside the window.
	pub fn cutoff(self, now: DateTime) -> DateTime {
		TimeDelta::from_std(self.0)
			.ok()
			.and_then(|window| (*now).checked_sub_signed(window))
			.map_or(DateTime::MIN, DateTime::from)
	}
}

impl Default for UnreadWindow {
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl From<Duration> for UnreadWindow {
	fn from(duration: Duration) -> Self {
		Self(duration)
	}
}
