use gl_ledger::TransactionId;
use gl_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
	#[error(transparent)]
	Store(#[from] StoreError),
	#[error("unknown transaction <id='{0}'>")]
	UnknownTransaction(TransactionId),
	#[error("transaction already recorded <id='{0}'>")]
	DuplicateTransaction(TransactionId),
}

impl CoreError {
	pub fn is_not_configured(&self) -> bool {
		matches!(self, Self::Store(e) if e.is_not_configured())
	}

	/// Best available reason string for a one-shot user notification.
	pub fn reason(&self) -> String {
		match self {
			Self::Store(e) => e.reason(),
			other => other.to_string(),
		}
	}
}
