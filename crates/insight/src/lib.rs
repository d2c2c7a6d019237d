//! Advisory tips for a piece of equipment, generated on a best-effort basis.
//!
//! Nothing here may block or fail the recording of a transaction: every failure
//! collapses into `None` and is only logged.

use std::sync::Arc;

use async_trait::async_trait;
use gl_ledger::Advisory;

mod error;
pub mod extract;
mod gemini;
mod session;

pub use error::InsightError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use session::{InsightSession, MIN_ITEM_CHARS};

#[async_trait]
pub trait InsightProvider: Send + Sync {
	/// A tip for `item`, or `None` on any failure.
	async fn insight(&self, item: &str) -> Option<Advisory>;
}

/// Provider used when no generator is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

#[async_trait]
impl InsightProvider for Disabled {
	async fn insight(&self, _item: &str) -> Option<Advisory> {
		None
	}
}

#[async_trait]
impl<T: InsightProvider + ?Sized> InsightProvider for Arc<T> {
	async fn insight(&self, item: &str) -> Option<Advisory> {
		(**self).insight(item).await
	}
}

#[async_trait]
impl<T: InsightProvider + ?Sized> InsightProvider for Box<T> {
	async fn insight(&self, item: &str) -> Option<Advisory> {
		(**self).insight(item).await
	}
}
