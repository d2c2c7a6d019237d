use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::Duration,
};

use gl_ledger::Advisory;
use tokio::time::timeout;
use tracing::debug;

use crate::{gemini::DEFAULT_TIMEOUT, InsightProvider};

/// Item names shorter than this (after trimming) are not worth asking about.
pub const MIN_ITEM_CHARS: usize = 3;

/// Last-request-wins front for an [`InsightProvider`].
///
/// Every lookup supersedes the ones still in flight; a superseded lookup resolves to
/// `None` even if the provider answers, so a late tip can never land on the wrong item.
#[derive(Debug)]
pub struct InsightSession<P> {
	provider: P,
	generation: AtomicU64,
	timeout: Duration,
}

impl<P: InsightProvider> InsightSession<P> {
	pub fn new(provider: P) -> Self {
		Self {
			provider,
			generation: AtomicU64::new(0),
			timeout: DEFAULT_TIMEOUT,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Drops whatever is in flight, e.g. once the entry it was for got submitted.
	pub fn invalidate(&self) {
		self.generation.fetch_add(1, Ordering::AcqRel);
	}

	pub async fn lookup(&self, item: &str) -> Option<Advisory> {
		let ticket = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

		if item.trim().chars().count() < MIN_ITEM_CHARS {
			return None;
		}

		let advisory = match timeout(self.timeout, self.provider.insight(item)).await {
			Ok(advisory) => advisory,
			Err(_) => {
				debug!(%item, timeout = ?self.timeout, "Insight timed out");
				None
			}
		};

		if self.generation.load(Ordering::Acquire) != ticket {
			debug!(%item, "Discarding superseded insight");
			return None;
		}

		advisory
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use async_trait::async_trait;
	use futures::join;
	use tokio::time::sleep;
	use tracing_test::traced_test;

	use super::*;

	/// Answers after `delay`, echoing the item name as the tip.
	#[derive(Default)]
	struct Echo {
		delay: Duration,
		calls: AtomicUsize,
	}

	#[async_trait]
	impl InsightProvider for Echo {
		async fn insight(&self, item: &str) -> Option<Advisory> {
			self.calls.fetch_add(1, Ordering::Relaxed);
			sleep(if item.starts_with("slow") {
				self.delay
			} else {
				Duration::ZERO
			})
			.await;

			Some(Advisory {
				quick_guide: Some(item.to_string()),
				..Default::default()
			})
		}
	}

	#[tokio::test(start_paused = true)]
	#[traced_test]
	async fn newer_lookup_supersedes_older_one() {
		let session = InsightSession::new(Echo {
			delay: Duration::from_millis(500),
			..Default::default()
		});

		let (stale, fresh) = join!(session.lookup("slow tripod"), async {
			sleep(Duration::from_millis(10)).await;
			session.lookup("camera").await
		});

		assert_eq!(stale, None);
		assert_eq!(fresh.unwrap().quick_guide.as_deref(), Some("camera"));
	}

	#[tokio::test(start_paused = true)]
	async fn slow_providers_time_out() {
		let session = InsightSession::new(Echo {
			delay: Duration::from_secs(60),
			..Default::default()
		})
		.with_timeout(Duration::from_secs(1));

		assert_eq!(session.lookup("slow crane").await, None);
	}

	#[tokio::test]
	async fn short_names_are_skipped() {
		let session = InsightSession::new(Echo::default());

		assert_eq!(session.lookup(" ab ").await, None);
		assert_eq!(session.provider.calls.load(Ordering::Relaxed), 0);
		assert!(session.lookup("abc").await.is_some());
	}

	#[tokio::test(start_paused = true)]
	async fn invalidate_drops_in_flight_lookup() {
		let session = InsightSession::new(Echo {
			delay: Duration::from_millis(100),
			..Default::default()
		});

		let (result, ()) = join!(session.lookup("slow dolly"), async {
			sleep(Duration::from_millis(10)).await;
			session.invalidate();
		});

		assert_eq!(result, None);
	}
}
