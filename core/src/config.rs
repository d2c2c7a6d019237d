//! Environment-driven configuration.
//!
//! A missing value never panics: it leaves the matching collaborator unconfigured and the
//! application shows that state instead.

use std::{env, str::FromStr, time::Duration};

use gl_insight::GeminiConfig;
use gl_store::StoreConfig;
use tracing::warn;

pub const STORE_URL: &str = "SUPABASE_URL";
pub const STORE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const STORE_TABLE: &str = "GEARLOG_TABLE";
pub const STORE_TIMEOUT_SECS: &str = "GEARLOG_STORE_TIMEOUT_SECS";
pub const INSIGHT_API_KEY: &str = "API_KEY";
pub const INSIGHT_API_KEY_ALIAS: &str = "GEMINI_API_KEY";
pub const INSIGHT_MODEL: &str = "GEARLOG_INSIGHT_MODEL";
pub const INSIGHT_TIMEOUT_MS: &str = "GEARLOG_INSIGHT_TIMEOUT_MS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
	pub store: Option<StoreConfig>,
	pub insight: Option<GeminiConfig>,
}

impl Config {
	pub fn from_env() -> Self {
		Self::from_lookup(|key| env::var(key).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let value = |key: &str| {
			lookup(key)
				.map(|value| value.trim().to_string())
				.filter(|value| !value.is_empty() && value != "undefined")
		};

		let store = value(STORE_URL)
			.zip(value(STORE_ANON_KEY))
			.map(|(url, anon_key)| {
				let mut config = StoreConfig::new(url, anon_key);
				if let Some(table) = value(STORE_TABLE) {
					config = config.with_table(table);
				}
				if let Some(secs) = parsed::<u64>(STORE_TIMEOUT_SECS, value(STORE_TIMEOUT_SECS)) {
					config = config.with_timeout(Duration::from_secs(secs));
				}
				config
			});

		let insight = value(INSIGHT_API_KEY)
			.or_else(|| value(INSIGHT_API_KEY_ALIAS))
			.map(|api_key| {
				let mut config = GeminiConfig::new(api_key);
				if let Some(model) = value(INSIGHT_MODEL) {
					config = config.with_model(model);
				}
				if let Some(ms) = parsed::<u64>(INSIGHT_TIMEOUT_MS, value(INSIGHT_TIMEOUT_MS)) {
					config = config.with_timeout(Duration::from_millis(ms));
				}
				config
			});

		Self { store, insight }
	}
}

fn parsed<T: FromStr>(key: &str, raw: Option<String>) -> Option<T> {
	let raw = raw?;
	match raw.parse() {
		Ok(value) => Some(value),
		Err(_) => {
			warn!("Ignoring invalid value for {key}: {raw:?}");
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn config(vars: &[(&str, &str)]) -> Config {
		let vars = vars
			.iter()
			.map(|(key, value)| (key.to_string(), value.to_string()))
			.collect::<HashMap<_, _>>();

		Config::from_lookup(|key| vars.get(key).cloned())
	}

	#[test]
	fn nothing_set_means_nothing_configured() {
		assert_eq!(config(&[]), Config::default());
	}

	#[test]
	fn store_needs_both_url_and_key() {
		assert!(config(&[(STORE_URL, "https://xyz.supabase.co")]).store.is_none());
		assert!(config(&[(STORE_URL, "https://xyz.supabase.co"), (STORE_ANON_KEY, "undefined")])
			.store
			.is_none());

		let store = config(&[
			(STORE_URL, "https://xyz.supabase.co"),
			(STORE_ANON_KEY, "anon"),
			(STORE_TABLE, "loans"),
			(STORE_TIMEOUT_SECS, "3"),
		])
		.store
		.unwrap();

		assert_eq!(store.table, "loans");
		assert_eq!(store.timeout, Duration::from_secs(3));
	}

	#[test]
	fn insight_key_alias_and_bad_numbers() {
		let insight = config(&[
			(INSIGHT_API_KEY_ALIAS, "secret"),
			(INSIGHT_MODEL, "gemini-1.5-flash"),
			(INSIGHT_TIMEOUT_MS, "soon"),
		])
		.insight
		.unwrap();

		assert_eq!(insight.api_key, "secret");
		assert_eq!(insight.model, "gemini-1.5-flash");
		assert_eq!(insight.timeout, GeminiConfig::new("x").timeout);
	}
}
