use std::path::Path;

use anyhow::{anyhow, bail, Context as _, Result};
use gl_core::{
	ledger::{photo, Advisory, Transaction, TransactionDraft, TransactionKind},
	Removal, StoreStatus, Summary,
};
use serde::Serialize;
use tracing::warn;

use crate::{
	context::Context,
	util::{
		confirm::Prompt,
		output::{kind_label, transaction_line},
	},
};

pub mod args;

use args::{DeleteArgs, EntryArgs, HistoryArgs};

const NOT_CONFIGURED: &str =
	"Transaction store not configured, set SUPABASE_URL and SUPABASE_ANON_KEY";

#[derive(Serialize)]
struct StatusOutput {
	store: StoreStatus,
	summary: Summary,
}

fn print_store_state(status: &StoreStatus) {
	match status {
		StoreStatus::NotConfigured => println!("{NOT_CONFIGURED}"),
		StoreStatus::Degraded { reason } => println!("Store unavailable: {reason}"),
		StoreStatus::Idle | StoreStatus::Ready => {}
	}
}

pub fn print_advisory(advisory: &Advisory) {
	if let Some(category) = &advisory.category {
		println!("  Category:  {category}");
	}
	if let Some(safety_note) = &advisory.safety_note {
		println!("  Safety:    {safety_note}");
	}
	if let Some(quick_guide) = &advisory.quick_guide {
		println!("  Handling:  {quick_guide}");
	}
}

/// Loads the list for reading; a failing store only degrades the output.
async fn load_for_reading(ctx: &Context) {
	if let Err(e) = ctx.node.controller.load().await {
		if !e.is_not_configured() {
			warn!("Showing an empty list: {e}");
		}
	}
}

/// Loads the list before a write; writes need a configured store.
async fn load_for_writing(ctx: &Context) -> Result<()> {
	match ctx.node.controller.load().await {
		Ok(_) => Ok(()),
		Err(e) if e.is_not_configured() => bail!(NOT_CONFIGURED),
		Err(e) => {
			warn!("Continuing without the current list: {e}");
			Ok(())
		}
	}
}

pub async fn run_status(ctx: &Context) -> Result<()> {
	load_for_reading(ctx).await;

	let output = StatusOutput {
		store: ctx.node.controller.status().await,
		summary: ctx.node.controller.summary().await,
	};

	crate::print_output!(ctx, output, |output: &StatusOutput| {
		print_store_state(&output.store);
		println!("{}", output.summary.headline());

		for transaction in &output.summary.outstanding {
			println!(
				"  {:<24} {:<12} since {}",
				transaction.item,
				transaction.person,
				transaction.date.format("%d.%m.%Y")
			);
		}

		if !output.summary.returned.is_empty() {
			println!("Returned:");
		}
		for transaction in &output.summary.returned {
			println!(
				"  {:<24} {:<12} on {}",
				transaction.item,
				transaction.person,
				transaction.date.format("%d.%m.%Y")
			);
		}
	});

	Ok(())
}

pub async fn run_history(ctx: &Context, args: HistoryArgs) -> Result<()> {
	load_for_reading(ctx).await;

	let status = ctx.node.controller.status().await;
	let mut history = ctx.node.controller.history().await;
	if let Some(limit) = args.limit {
		history.truncate(limit);
	}

	crate::print_output!(ctx, history, |history: &Vec<Transaction>| {
		print_store_state(&status);

		if history.is_empty() {
			println!("No transactions recorded yet.");
		}

		for transaction in history {
			println!("{}", transaction_line(transaction));
			if let Some(remarks) = &transaction.remarks {
				println!("    {remarks}");
			}
		}
	});

	Ok(())
}

async fn read_photo(path: &Path) -> Result<String> {
	let mime = mime_guess::from_path(path).first_or_octet_stream();
	if mime.type_() != mime_guess::mime::IMAGE {
		bail!("{} does not look like an image", path.display());
	}

	let bytes = tokio::fs::read(path)
		.await
		.with_context(|| format!("Failed to read photo {}", path.display()))?;

	Ok(photo::data_uri(mime.essence_str(), &bytes))
}

pub async fn run_record(ctx: &Context, kind: TransactionKind, args: EntryArgs) -> Result<()> {
	load_for_writing(ctx).await?;

	let controller = &ctx.node.controller;
	let current = controller
		.outstanding()
		.await
		.into_iter()
		.find(|transaction| transaction.item == args.item);

	// Re-loans and returns of items not on loan are allowed, just worth a heads-up
	match (kind, &current) {
		(TransactionKind::Loan, Some(on_loan)) => warn!(
			"{} is already on loan to {} since {}, recording anyway",
			on_loan.item, on_loan.person, on_loan.date
		),
		(TransactionKind::Return, None) => {
			warn!("{} is not on loan, recording the return anyway", args.item)
		}
		_ => {}
	}

	let photo = match &args.photo {
		Some(path) => Some(read_photo(path).await?),
		None => None,
	};

	let item = args.item.clone();
	let no_insight = args.no_insight;
	let mut draft = TransactionDraft::new(kind, args.item, args.person);
	if let Some(date) = args.date {
		draft = draft.with_date(date);
	}
	if let Some(remarks) = args.remarks {
		draft = draft.with_remarks(remarks);
	}
	if let Some(photo) = photo {
		draft = draft.with_photo(photo);
	}

	let insight = async {
		if no_insight {
			None
		} else {
			ctx.node.insight.lookup(&item).await
		}
	};

	// The tip is display only, so the write never waits for it.
	let (saved, advisory) = tokio::join!(controller.submit(draft), insight);
	let mut transaction = saved.map_err(|e| anyhow!("Saving failed: {}", e.reason()))?;
	transaction.advisory = advisory.and_then(Advisory::non_empty);

	crate::print_output!(ctx, transaction, |transaction: &Transaction| {
		println!(
			"Recorded {}: {}",
			kind_label(transaction.kind),
			transaction_line(transaction)
		);
		if let Some(advisory) = &transaction.advisory {
			print_advisory(advisory);
		}
	});

	Ok(())
}

pub async fn run_delete(ctx: &Context, args: DeleteArgs) -> Result<()> {
	load_for_writing(ctx).await?;

	let removal = ctx
		.node
		.controller
		.remove(
			&args.transaction_id(),
			Prompt {
				assume_yes: args.yes,
			},
		)
		.await
		.map_err(|e| anyhow!("Deleting failed: {}", e.reason()))?;

	let removed = match removal {
		Removal::Removed(transaction) => Some(transaction),
		Removal::Declined => None,
	};

	crate::print_output!(ctx, removed, |removed: &Option<Transaction>| {
		match removed {
			Some(transaction) => println!("Deleted {}", transaction_line(transaction)),
			None => println!("Nothing deleted."),
		}
	});

	Ok(())
}
