use anyhow::Result;
use gl_core::ledger::{Transaction, TransactionKind};
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

pub fn kind_label(kind: TransactionKind) -> &'static str {
	match kind {
		TransactionKind::Loan => "LOAN",
		TransactionKind::Return => "RETURN",
	}
}

/// One history row: `date  person  kind  item  (id)`.
pub fn transaction_line(transaction: &Transaction) -> String {
	let person = if transaction.person.is_empty() {
		"unknown"
	} else {
		transaction.person.as_str()
	};

	format!(
		"{}  {:<12} {:<7} {}  ({})",
		transaction.date.format("%d.%m.%Y"),
		person,
		kind_label(transaction.kind),
		transaction.item,
		transaction.id
	)
}
