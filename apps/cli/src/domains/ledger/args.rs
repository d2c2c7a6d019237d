use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use gl_core::ledger::TransactionId;

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
	/// Show at most this many entries
	#[arg(long)]
	pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct EntryArgs {
	/// Item name, matched exactly against earlier entries
	pub item: String,

	/// Who borrows or returns the item
	#[arg(long, short)]
	pub person: String,

	/// Date of the handover (YYYY-MM-DD), defaults to today
	#[arg(long)]
	pub date: Option<NaiveDate>,

	/// Free-text remarks
	#[arg(long, short)]
	pub remarks: Option<String>,

	/// Image file to attach
	#[arg(long)]
	pub photo: Option<PathBuf>,

	/// Skip asking for a handling tip
	#[arg(long, default_value_t = false)]
	pub no_insight: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
	/// Id of the transaction to delete
	pub id: String,

	/// Do not ask for confirmation
	#[arg(long, short, default_value_t = false)]
	pub yes: bool,
}

impl DeleteArgs {
	pub fn transaction_id(&self) -> TransactionId {
		TransactionId::from(self.id.as_str())
	}
}
