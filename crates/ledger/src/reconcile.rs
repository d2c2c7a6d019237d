//! Derives current possession state from the raw event log.
//!
//! Per item the state machine is `OUT -> ON_LOAN <-> RETURNED`, where `OUT` is simply
//! the absence of any event. A later loan of an item already on loan overwrites the
//! earlier one. The last event by `timestamp` always wins, regardless of its kind.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PossessionState {
	OnLoan,
	Returned,
}

/// The latest event recorded for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPossession<'a> {
	pub state: PossessionState,
	pub event: &'a Transaction,
}

/// Folds the log into `item -> (position in timestamp order, latest event)`.
///
/// Item names are compared exactly: `"Drill"` and `"drill "` are two different items.
fn fold_latest(transactions: &[Transaction]) -> BTreeMap<&str, (usize, &Transaction)> {
	let mut ordered = transactions.iter().collect::<Vec<_>>();
	// stable, so equal stamps keep their input order
	ordered.sort_by_key(|transaction| transaction.timestamp);

	ordered
		.into_iter()
		.enumerate()
		.fold(BTreeMap::new(), |mut latest, (position, transaction)| {
			latest.insert(transaction.item.as_str(), (position, transaction));
			latest
		})
}

/// Current state of every item that has at least one event, keyed by item name.
pub fn possession(transactions: &[Transaction]) -> BTreeMap<&str, ItemPossession<'_>> {
	fold_latest(transactions)
		.into_iter()
		.map(|(item, (_, event))| {
			let state = match event.kind {
				TransactionKind::Loan => PossessionState::OnLoan,
				TransactionKind::Return => PossessionState::Returned,
			};

			(item, ItemPossession { state, event })
		})
		.collect()
}

/// Items currently on loan, each represented by the loan event that put it there.
///
/// The result comes back in timestamp order of those loan events, but callers that
/// display it should sort it themselves.
pub fn outstanding(transactions: &[Transaction]) -> Vec<Transaction> {
	let latest = fold_latest(transactions);
	let items = latest.len();

	let mut on_loan = latest
		.into_values()
		.filter(|(_, event)| event.is_loan())
		.collect::<Vec<_>>();
	on_loan.sort_unstable_by_key(|(position, _)| *position);

	trace!(
		events = transactions.len(),
		items,
		outstanding = on_loan.len(),
		"reconciled possession state"
	);

	on_loan
		.into_iter()
		.map(|(_, event)| event.clone())
		.collect()
}
