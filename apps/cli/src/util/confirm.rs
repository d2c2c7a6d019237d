use std::io::{self, BufRead, Write};

use gl_core::{ledger::Transaction, Confirm};

use super::output::transaction_line;

/// Asks on the terminal unless `--yes` was given.
pub struct Prompt {
	pub assume_yes: bool,
}

impl Confirm for Prompt {
	fn confirm(&self, transaction: &Transaction) -> bool {
		if self.assume_yes {
			return true;
		}

		print!("Delete {}? [y/N] ", transaction_line(transaction));
		if io::stdout().flush().is_err() {
			return false;
		}

		let mut answer = String::new();
		match io::stdin().lock().read_line(&mut answer) {
			Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
			Err(_) => false,
		}
	}
}
