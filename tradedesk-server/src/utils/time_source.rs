use crate::types::date_time::DateTime;
use chrono::TimeDelta;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Source of the current wall clock time.
///
/// The default time source reads the system clock. A test time source stands still until it is advanced
/// explicitly, cloned time sources share the same test clock.
#[derive(Clone, Default)]
pub struct TimeSource {
	test_clock: Option<Arc<Mutex<DateTime>>>,
}

impl TimeSource {
	pub fn test(start: DateTime) -> Self {
		Self {
			test_clock: Some(Arc::new(Mutex::new(start))),
		}
	}

	pub fn now(&self) -> DateTime {
		match &self.test_clock {
			None => DateTime::now(),
			Some(clock) => *clock.lock(),
		}
	}

	pub fn advance_time(&self, by_duration: Duration) {
		let clock = self.test_clock.as_ref().expect("Can only be called in test mode.");
		let delta = TimeDelta::from_std(by_duration).expect("Duration out of range");

		let mut now = clock.lock();
		*now = DateTime::from(**now + delta);
	}
}
