//! Keeps the local event list in step with the remote store.
//!
//! Mutations are applied locally first and rolled back when the store refuses them.
//! The local lock is never held across a store call, so readers always see a
//! consistent snapshot while a request is pending. Writes still in flight, or settled
//! after a running fetch started, are laid over that fetch's result when it lands.

use gl_ledger::{outstanding, Clock, Transaction, TransactionDraft, TransactionId};
use gl_store::{StoreError, TransactionStore};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::{CoreError, EventBus, LedgerEvent, Summary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StoreStatus {
	/// No credentials; nothing will be attempted.
	NotConfigured,
	/// Configured but never loaded.
	Idle,
	/// Last load succeeded.
	Ready,
	/// Last load failed; the list was emptied rather than left stale.
	Degraded { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
	Removed(Transaction),
	Declined,
}

/// The yes/no gate every removal has to pass before anything is touched.
pub trait Confirm {
	fn confirm(&self, transaction: &Transaction) -> bool;
}

impl<F: Fn(&Transaction) -> bool> Confirm for F {
	fn confirm(&self, transaction: &Transaction) -> bool {
		self(transaction)
	}
}

/// A local write the store has not necessarily reflected in a fetch yet.
#[derive(Debug, Clone)]
enum Overlay {
	Insert(Transaction),
	Delete(TransactionId),
}

#[derive(Debug)]
struct Unsynced {
	ticket: u64,
	overlay: Overlay,
	/// Value of `Ledger::fetches` when the store confirmed the write, `None` while in flight.
	settled: Option<u64>,
}

#[derive(Debug)]
struct Ledger {
	transactions: Vec<Transaction>,
	outstanding: Vec<Transaction>,
	status: StoreStatus,
	unsynced: Vec<Unsynced>,
	tickets: u64,
	/// Fetches started so far.
	fetches: u64,
	/// Newest fetch whose result was applied.
	applied: u64,
}

impl Ledger {
	fn new(status: StoreStatus) -> Self {
		Self {
			transactions: Vec::new(),
			outstanding: Vec::new(),
			status,
			unsynced: Vec::new(),
			tickets: 0,
			fetches: 0,
			applied: 0,
		}
	}

	// Every mutation goes through `reconcile`; possession is never patched incrementally.
	fn reconcile(&mut self) {
		self.outstanding = outstanding(&self.transactions);
	}

	fn begin_fetch(&mut self) -> u64 {
		self.fetches += 1;
		self.fetches
	}

	/// Installs the result of fetch number `fetch`, keeping local writes it may have missed.
	///
	/// Returns `false` when a newer fetch was applied already and this one got dropped.
	fn replace(&mut self, transactions: Vec<Transaction>, fetch: u64) -> bool {
		if fetch < self.applied {
			return false;
		}
		self.applied = fetch;

		// Writes settled before this fetch started are part of its result.
		self.unsynced
			.retain(|unsynced| unsynced.settled.map_or(true, |settled| settled >= fetch));

		self.transactions = transactions;
		for unsynced in &self.unsynced {
			match &unsynced.overlay {
				Overlay::Insert(transaction) => {
					if self.find(&transaction.id).is_none() {
						self.transactions.push(transaction.clone());
					}
				}
				Overlay::Delete(id) => self.transactions.retain(|transaction| &transaction.id != id),
			}
		}
		self.reconcile();

		true
	}

	fn track(&mut self, overlay: Overlay) -> u64 {
		self.tickets += 1;
		self.unsynced.push(Unsynced {
			ticket: self.tickets,
			overlay,
			settled: None,
		});

		self.tickets
	}

	/// The store confirmed the write behind `ticket`.
	fn settle(&mut self, ticket: u64) {
		if self.fetches == self.applied {
			// no fetch in flight that could have missed it
			self.forget(ticket);
		} else if let Some(unsynced) = self.unsynced.iter_mut().find(|u| u.ticket == ticket) {
			unsynced.settled = Some(self.fetches);
		}
	}

	/// The store refused the write behind `ticket`.
	fn forget(&mut self, ticket: u64) {
		self.unsynced.retain(|unsynced| unsynced.ticket != ticket);
	}

	fn push(&mut self, transaction: Transaction) -> u64 {
		self.transactions.push(transaction.clone());
		self.reconcile();

		self.track(Overlay::Insert(transaction))
	}

	/// Puts a transaction back unless a fetch already brought it back.
	fn restore(&mut self, transaction: Transaction) {
		if self.find(&transaction.id).is_none() {
			self.transactions.push(transaction);
			self.reconcile();
		}
	}

	fn take(&mut self, id: &TransactionId) -> Option<Transaction> {
		let index = self
			.transactions
			.iter()
			.position(|transaction| &transaction.id == id)?;
		let transaction = self.transactions.remove(index);
		self.reconcile();

		Some(transaction)
	}

	fn find(&self, id: &TransactionId) -> Option<&Transaction> {
		self.transactions
			.iter()
			.find(|transaction| &transaction.id == id)
	}
}

/// Owner of the local list of transactions.
#[derive(Debug)]
pub struct Controller<S> {
	store: Option<S>,
	ledger: RwLock<Ledger>,
	clock: Clock,
	events: EventBus,
}

impl<S: TransactionStore> Controller<S> {
	pub fn new(store: S) -> Self {
		Self {
			store: Some(store),
			ledger: RwLock::new(Ledger::new(StoreStatus::Idle)),
			clock: Clock::new(),
			events: EventBus::default(),
		}
	}

	/// A controller that reports [`StoreStatus::NotConfigured`] and never retries.
	pub fn unconfigured() -> Self {
		Self {
			store: None,
			ledger: RwLock::new(Ledger::new(StoreStatus::NotConfigured)),
			clock: Clock::new(),
			events: EventBus::default(),
		}
	}

	fn store(&self) -> Result<&S, CoreError> {
		self.store.as_ref().ok_or_else(|| {
			self.events.emit(LedgerEvent::NotConfigured);
			CoreError::Store(StoreError::NotConfigured)
		})
	}

	pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
		self.events.subscribe()
	}

	pub async fn status(&self) -> StoreStatus {
		self.ledger.read().await.status.clone()
	}

	/// Replaces the local list with everything the store holds.
	///
	/// On failure the list is emptied, never left partial or stale. Writes still in flight
	/// stay visible either way.
	pub async fn load(&self) -> Result<usize, CoreError> {
		let store = self.store()?;
		let fetch = self.ledger.write().await.begin_fetch();

		match store.fetch_all().await {
			Ok(transactions) => {
				for transaction in &transactions {
					self.clock.observe(transaction.timestamp);
				}
				let count = transactions.len();

				{
					let mut ledger = self.ledger.write().await;
					if !ledger.replace(transactions, fetch) {
						debug!(fetch, "Dropping a fetch that a newer one overtook");
						return Ok(count);
					}
					ledger.status = StoreStatus::Ready;
				}

				info!(count, "Loaded transactions");
				self.events.emit(LedgerEvent::Loaded { count });

				Ok(count)
			}
			Err(e) => {
				error!("Failed to load transactions: {e}");
				let reason = e.reason();

				{
					let mut ledger = self.ledger.write().await;
					if ledger.replace(Vec::new(), fetch) {
						ledger.status = StoreStatus::Degraded {
							reason: reason.clone(),
						};
					}
				}

				self.events.emit(LedgerEvent::LoadFailed { reason });

				Err(e.into())
			}
		}
	}

	/// Stamps a draft with a fresh id and timestamp, then [`Controller::add`]s it.
	pub async fn submit(&self, draft: TransactionDraft) -> Result<Transaction, CoreError> {
		let transaction = draft.into_transaction(&self.clock);
		self.add(transaction.clone()).await?;

		Ok(transaction)
	}

	/// Appends locally, then inserts remotely; a refused insert is rolled back.
	pub async fn add(&self, transaction: Transaction) -> Result<(), CoreError> {
		let store = self.store()?;

		let ticket = {
			let mut ledger = self.ledger.write().await;
			if ledger.find(&transaction.id).is_some() {
				return Err(CoreError::DuplicateTransaction(transaction.id));
			}
			ledger.push(transaction.clone())
		};
		self.clock.observe(transaction.timestamp);

		match store.insert(&transaction).await {
			Ok(()) => {
				self.ledger.write().await.settle(ticket);
				debug!(id = %transaction.id, item = %transaction.item, "Transaction saved");
				self.events.emit(LedgerEvent::Added { id: transaction.id });

				Ok(())
			}
			Err(e) => {
				warn!(id = %transaction.id, "Saving transaction failed, rolling back: {e}");
				{
					let mut ledger = self.ledger.write().await;
					ledger.forget(ticket);
					ledger.take(&transaction.id);
				}

				self.events.emit(LedgerEvent::AddRolledBack {
					id: transaction.id,
					reason: e.reason(),
				});

				Err(e.into())
			}
		}
	}

	/// Asks `confirm` first; only a confirmed removal touches the list or the store.
	///
	/// A row the store no longer has counts as removed.
	pub async fn remove(
		&self,
		id: &TransactionId,
		confirm: impl Confirm,
	) -> Result<Removal, CoreError> {
		let store = self.store()?;

		let target = self
			.ledger
			.read()
			.await
			.find(id)
			.cloned()
			.ok_or_else(|| CoreError::UnknownTransaction(id.clone()))?;

		if !confirm.confirm(&target) {
			debug!(%id, "Removal declined");
			return Ok(Removal::Declined);
		}

		let (removed, ticket) = {
			let mut ledger = self.ledger.write().await;
			let removed = ledger
				.take(id)
				.ok_or_else(|| CoreError::UnknownTransaction(id.clone()))?;

			(removed, ledger.track(Overlay::Delete(id.clone())))
		};

		match store.delete_by_id(id).await {
			Ok(()) => self.ledger.write().await.settle(ticket),
			Err(StoreError::NotFound(_)) => {
				warn!(%id, "Transaction was already gone from the store");
				self.ledger.write().await.settle(ticket);
			}
			Err(e) => {
				warn!(%id, "Deleting transaction failed, restoring it: {e}");
				{
					let mut ledger = self.ledger.write().await;
					ledger.forget(ticket);
					ledger.restore(removed);
				}

				self.events.emit(LedgerEvent::RemoveRolledBack {
					id: id.clone(),
					reason: e.reason(),
				});

				return Err(e.into());
			}
		}

		debug!(%id, "Transaction removed");
		self.events.emit(LedgerEvent::Removed { id: id.clone() });

		Ok(Removal::Removed(removed))
	}

	/// The local list in its current (unspecified) order.
	pub async fn transactions(&self) -> Vec<Transaction> {
		self.ledger.read().await.transactions.clone()
	}

	/// Newest first.
	pub async fn history(&self) -> Vec<Transaction> {
		let mut history = self.transactions().await;
		history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

		history
	}

	pub async fn outstanding(&self) -> Vec<Transaction> {
		self.ledger.read().await.outstanding.clone()
	}

	pub async fn summary(&self) -> Summary {
		let ledger = self.ledger.read().await;

		Summary::new(&ledger.transactions, &ledger.outstanding)
	}
}
