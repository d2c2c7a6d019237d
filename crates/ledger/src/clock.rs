use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Millisecond wall clock that never hands out the same value twice.
///
/// Event ordering relies on `timestamp` strictly increasing with creation order, so two
/// drafts submitted within the same millisecond still get distinct, ordered stamps.
#[derive(Debug, Default)]
pub struct Clock {
	last: AtomicI64,
}

impl Clock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `max(now, last + 1)` and remembers it.
	pub fn now_millis(&self) -> i64 {
		let now = Utc::now().timestamp_millis();
		let mut last = self.last.load(Ordering::Acquire);

		loop {
			let next = now.max(last.saturating_add(1));
			match self
				.last
				.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
			{
				Ok(_) => return next,
				Err(actual) => last = actual,
			}
		}
	}

	/// Makes sure future stamps come after `timestamp`, e.g. after loading a log written
	/// by a client whose clock runs ahead of ours.
	pub fn observe(&self, timestamp: i64) {
		self.last.fetch_max(timestamp, Ordering::AcqRel);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stamps_strictly_increase() {
		let clock = Clock::new();
		let stamps = (0..1_000).map(|_| clock.now_millis()).collect::<Vec<_>>();

		assert!(stamps.windows(2).all(|w| w[0] < w[1]));
	}

	#[test]
	fn observed_future_stamp_is_respected() {
		let clock = Clock::new();
		let far_future = Utc::now().timestamp_millis() + 60_000;

		clock.observe(far_future);

		assert_eq!(clock.now_millis(), far_future + 1);
	}
}
