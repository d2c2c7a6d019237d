use std::sync::Arc;

use async_trait::async_trait;
use gl_ledger::{Transaction, TransactionId};
use tokio::sync::{Mutex, Notify};
use tracing::debug;

use crate::{StoreError, TransactionStore};

#[derive(Debug, Default)]
struct Failures {
	fetch: Option<String>,
	insert: Option<String>,
	delete: Option<String>,
}

/// In-process store with scriptable failures, for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
	rows: Mutex<Vec<Transaction>>,
	failures: Mutex<Failures>,
	insert_latch: Option<Arc<Notify>>,
	delete_latch: Option<Arc<Notify>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_rows(rows: impl IntoIterator<Item = Transaction>) -> Self {
		Self {
			rows: Mutex::new(rows.into_iter().collect()),
			..Default::default()
		}
	}

	/// Every insert waits for a permit on `latch` before it completes.
	pub fn with_insert_latch(mut self, latch: Arc<Notify>) -> Self {
		self.insert_latch = Some(latch);
		self
	}

	/// Every delete waits for a permit on `latch` before it completes.
	pub fn with_delete_latch(mut self, latch: Arc<Notify>) -> Self {
		self.delete_latch = Some(latch);
		self
	}

	pub async fn rows(&self) -> Vec<Transaction> {
		self.rows.lock().await.clone()
	}

	/// Every fetch fails until [`MemoryStore::recover`] is called.
	pub async fn fail_fetch(&self, reason: impl Into<String>) {
		self.failures.lock().await.fetch = Some(reason.into());
	}

	pub async fn fail_next_insert(&self, reason: impl Into<String>) {
		self.failures.lock().await.insert = Some(reason.into());
	}

	pub async fn fail_next_delete(&self, reason: impl Into<String>) {
		self.failures.lock().await.delete = Some(reason.into());
	}

	pub async fn recover(&self) {
		*self.failures.lock().await = Failures::default();
	}
}

#[async_trait]
impl TransactionStore for MemoryStore {
	async fn fetch_all(&self) -> Result<Vec<Transaction>, StoreError> {
		if let Some(reason) = &self.failures.lock().await.fetch {
			return Err(StoreError::Request(reason.clone()));
		}

		let mut rows = self.rows().await;
		rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

		Ok(rows)
	}

	async fn insert(&self, transaction: &Transaction) -> Result<(), StoreError> {
		if let Some(latch) = &self.insert_latch {
			latch.notified().await;
		}

		if let Some(reason) = self.failures.lock().await.insert.take() {
			return Err(StoreError::Request(reason));
		}

		let mut rows = self.rows.lock().await;
		if rows.iter().any(|row| row.id == transaction.id) {
			return Err(StoreError::Status {
				status: 409,
				reason: format!("duplicate key value violates unique constraint <id='{}'>", transaction.id),
			});
		}

		rows.push(transaction.clone());
		debug!(id = %transaction.id, "Stored transaction in memory");

		Ok(())
	}

	async fn delete_by_id(&self, id: &TransactionId) -> Result<(), StoreError> {
		if let Some(latch) = &self.delete_latch {
			latch.notified().await;
		}

		if let Some(reason) = self.failures.lock().await.delete.take() {
			return Err(StoreError::Request(reason));
		}

		let mut rows = self.rows.lock().await;
		let before = rows.len();
		rows.retain(|row| &row.id != id);

		if rows.len() == before {
			return Err(StoreError::NotFound(id.clone()));
		}

		Ok(())
	}
}
