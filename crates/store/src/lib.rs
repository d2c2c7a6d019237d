//! Client side of the remote `transactions` table.
//!
//! The store only moves rows around. Possession state is never computed here.

use std::sync::Arc;

use async_trait::async_trait;
use gl_ledger::{Transaction, TransactionId};

mod config;
mod error;
mod memory;
mod supabase;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

/// CRUD over the append-only event log.
#[async_trait]
pub trait TransactionStore: Send + Sync {
	/// All rows. Servers usually return them newest first, but callers must not rely on it.
	async fn fetch_all(&self) -> Result<Vec<Transaction>, StoreError>;

	/// Appends one row. Succeeds only once the row is durably written.
	async fn insert(&self, transaction: &Transaction) -> Result<(), StoreError>;

	/// Deletes one row. A missing row is reported as [`StoreError::NotFound`].
	async fn delete_by_id(&self, id: &TransactionId) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: TransactionStore + ?Sized> TransactionStore for Arc<T> {
	async fn fetch_all(&self) -> Result<Vec<Transaction>, StoreError> {
		(**self).fetch_all().await
	}

	async fn insert(&self, transaction: &Transaction) -> Result<(), StoreError> {
		(**self).insert(transaction).await
	}

	async fn delete_by_id(&self, id: &TransactionId) -> Result<(), StoreError> {
		(**self).delete_by_id(id).await
	}
}
