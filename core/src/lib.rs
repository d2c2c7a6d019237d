use gl_insight::{Disabled, GeminiClient, InsightProvider, InsightSession};
use gl_store::SupabaseStore;
use tracing::{error, info, warn};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod summary;

pub use config::Config;
pub use controller::{Confirm, Controller, Removal, StoreStatus};
pub use error::CoreError;
pub use events::{EventBus, LedgerEvent};
pub use summary::Summary;

pub use gl_insight as insight;
pub use gl_ledger as ledger;
pub use gl_store as store;

#[cfg(debug_assertions)]
const CONSOLE_LOG_FILTER: LevelFilter = LevelFilter::DEBUG;

#[cfg(not(debug_assertions))]
const CONSOLE_LOG_FILTER: LevelFilter = LevelFilter::INFO;

const DEFAULT_DIRECTIVES: &str = "warn,gl_core=debug,gl_store=debug,gl_insight=debug,gearlog=debug";

/// Installs the global subscriber. `RUST_LOG` overrides the default directives.
pub fn init_logger() {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

	if let Err(e) = tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_filter(CONSOLE_LOG_FILTER),
		)
		.try_init()
	{
		eprintln!("Failed to initialize logger: {e}");
	}
}

/// Everything a presentation layer needs, wired from one [`Config`].
pub struct Node {
	pub controller: Controller<SupabaseStore>,
	pub insight: InsightSession<Box<dyn InsightProvider>>,
}

impl Node {
	pub fn new(config: Config) -> Self {
		let controller = match config.store.map(SupabaseStore::new) {
			Some(Ok(store)) => Controller::new(store),
			Some(Err(e)) => {
				if e.is_not_configured() {
					warn!("Transaction store credentials are blank, running without a store");
				} else {
					error!("Failed to set up transaction store: {e}");
				}
				Controller::unconfigured()
			}
			None => {
				warn!("SUPABASE_URL or SUPABASE_ANON_KEY missing, running without a store");
				Controller::unconfigured()
			}
		};

		let insight = match config.insight {
			Some(insight) => {
				let timeout = insight.timeout;
				match GeminiClient::new(insight) {
					Ok(client) => InsightSession::new(Box::new(client) as Box<dyn InsightProvider>)
						.with_timeout(timeout),
					Err(e) => {
						info!("Insights disabled: {e}");
						InsightSession::new(Box::new(Disabled) as Box<dyn InsightProvider>)
					}
				}
			}
			None => InsightSession::new(Box::new(Disabled) as Box<dyn InsightProvider>),
		};

		Self {
			controller,
			insight,
		}
	}
}
