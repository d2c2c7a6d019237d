//! Loan/return event log for shared equipment.
//!
//! The log is append-only: a [`Transaction`] is inserted or deleted wholesale and
//! never edited. Who currently holds what is never stored; it is always derived
//! from the full log by [`reconcile`].

pub mod clock;
pub mod photo;
pub mod reconcile;
pub mod transaction;

pub use clock::Clock;
pub use reconcile::{outstanding, possession, ItemPossession, PossessionState};
pub use transaction::{Advisory, Transaction, TransactionDraft, TransactionId, TransactionKind};
