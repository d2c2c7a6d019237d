//! Event bus for one-shot notifications to the presentation layer

use gl_ledger::TransactionId;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
	/// The store has no credentials. Persistent until reconfigured.
	NotConfigured,

	/// The local list was replaced by a fresh fetch
	Loaded { count: usize },

	/// Fetching failed, the local list was emptied
	LoadFailed { reason: String },

	/// An optimistic add was confirmed by the store
	Added { id: TransactionId },

	/// The store refused an add, the optimistic entry is gone again
	AddRolledBack { id: TransactionId, reason: String },

	/// A confirmed removal went through
	Removed { id: TransactionId },

	/// The store refused a removal, the entry is back
	RemoveRolledBack { id: TransactionId, reason: String },
}

/// Event bus for broadcasting ledger events
#[derive(Debug)]
pub struct EventBus {
	sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn emit(&self, event: LedgerEvent) {
		// No receivers is fine
		let _ = self.sender.send(event);
	}

	pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}
