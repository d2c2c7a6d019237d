use anyhow::Result;
use clap::{Parser, Subcommand};
use gl_core::{init_logger, Config, Node};

mod context;
mod domains;
mod util;

use context::{Context, OutputFormat};
use domains::{
	insight::{run_insight, InsightArgs},
	ledger::{
		args::{DeleteArgs, EntryArgs, HistoryArgs},
		run_delete, run_history, run_record, run_status,
	},
};
use gl_core::ledger::TransactionKind;

#[derive(Parser, Debug)]
#[command(name = "gearlog", about = "Who borrowed which piece of equipment")]
struct Cli {
	/// Output format
	#[arg(long, value_enum, default_value = "human", global = true)]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Items currently on loan
	Status,
	/// Recorded transactions, newest first
	History(HistoryArgs),
	/// Record that someone borrowed an item
	Lend(EntryArgs),
	/// Record that an item came back
	Return(EntryArgs),
	/// Delete a recorded transaction
	Delete(DeleteArgs),
	/// Ask for a handling tip for an item
	Insight(InsightArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logger();

	let ctx = Context::new(Node::new(Config::from_env()), cli.format);

	match cli.command {
		Commands::Status => run_status(&ctx).await,
		Commands::History(args) => run_history(&ctx, args).await,
		Commands::Lend(args) => run_record(&ctx, TransactionKind::Loan, args).await,
		Commands::Return(args) => run_record(&ctx, TransactionKind::Return, args).await,
		Commands::Delete(args) => run_delete(&ctx, args).await,
		Commands::Insight(args) => run_insight(&ctx, args).await,
	}
}
