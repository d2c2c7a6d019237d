use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::context::Context;

#[derive(Args, Debug, Clone)]
pub struct InsightArgs {
	/// Item to ask about
	pub item: String,
}

#[derive(Serialize)]
struct InsightOutput {
	item: String,
	advisory: Option<gl_core::ledger::Advisory>,
}

pub async fn run_insight(ctx: &Context, args: InsightArgs) -> Result<()> {
	let advisory = ctx.node.insight.lookup(&args.item).await;

	let output = InsightOutput {
		item: args.item,
		advisory,
	};

	crate::print_output!(ctx, output, |output: &InsightOutput| {
		match &output.advisory {
			Some(advisory) => crate::domains::ledger::print_advisory(advisory),
			None => println!("No tip available for {}", output.item),
		}
	});

	Ok(())
}
