use std::time::Duration;

pub const DEFAULT_TABLE: &str = "transactions";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the event log lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
	pub url: String,
	pub anon_key: String,
	pub table: String,
	pub timeout: Duration,
}

impl StoreConfig {
	pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			anon_key: anon_key.into(),
			table: DEFAULT_TABLE.to_string(),
			timeout: DEFAULT_TIMEOUT,
		}
	}

	pub fn with_table(mut self, table: impl Into<String>) -> Self {
		self.table = table.into();
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// REST endpoint of the table, e.g. `https://xyz.supabase.co/rest/v1/transactions`.
	pub fn endpoint(&self) -> String {
		format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoint_ignores_trailing_slash() {
		let config = StoreConfig::new("https://xyz.supabase.co/", "anon");

		assert_eq!(config.endpoint(), "https://xyz.supabase.co/rest/v1/transactions");
		assert_eq!(
			config.with_table("loans").endpoint(),
			"https://xyz.supabase.co/rest/v1/loans"
		);
	}
}
