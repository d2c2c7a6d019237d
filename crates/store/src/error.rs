use gl_ledger::TransactionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
	/// Credentials or endpoint are missing. Persistent, retrying will not help.
	#[error("transaction store is not configured")]
	NotConfigured,
	#[error("request to the transaction store failed: {0}")]
	Request(String),
	#[error("transaction store rejected the request <status={status}>: {reason}")]
	Status { status: u16, reason: String },
	#[error("unexpected response from the transaction store: {0}")]
	Decode(String),
	#[error("transaction not found: {0}")]
	NotFound(TransactionId),
	#[error("transaction store did not confirm the write of {0}")]
	NotWritten(TransactionId),
}

impl StoreError {
	pub fn is_not_configured(&self) -> bool {
		matches!(self, Self::NotConfigured)
	}

	/// Best available human readable reason, for one-shot user notifications.
	pub fn reason(&self) -> String {
		match self {
			Self::Status { reason, .. } => reason.clone(),
			Self::Request(reason) | Self::Decode(reason) => reason.clone(),
			other => other.to_string(),
		}
	}
}
