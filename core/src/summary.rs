use gl_ledger::{possession, PossessionState, Transaction, TransactionKind};
use serde::Serialize;

/// Dashboard figures derived from the local list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
	pub total: usize,
	pub loans: usize,
	pub returns: usize,
	/// Newest loan first
	pub outstanding: Vec<Transaction>,
	/// Items whose latest event brought them back, newest return first
	pub returned: Vec<Transaction>,
}

impl Summary {
	pub fn new(transactions: &[Transaction], outstanding: &[Transaction]) -> Self {
		let loans = transactions
			.iter()
			.filter(|transaction| transaction.kind == TransactionKind::Loan)
			.count();

		let mut outstanding = outstanding.to_vec();
		outstanding.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

		let mut returned = possession(transactions)
			.into_values()
			.filter(|item| item.state == PossessionState::Returned)
			.map(|item| item.event.clone())
			.collect::<Vec<_>>();
		returned.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

		Self {
			total: transactions.len(),
			loans,
			returns: transactions.len() - loans,
			outstanding,
			returned,
		}
	}

	pub fn outstanding_count(&self) -> usize {
		self.outstanding.len()
	}

	pub fn headline(&self) -> String {
		match self.outstanding_count() {
			0 => "All equipment in stock".to_string(),
			1 => "1 item on loan".to_string(),
			n => format!("{n} items on loan"),
		}
	}
}
