use async_trait::async_trait;
use chrono::NaiveDate;
use gl_ledger::{Transaction, TransactionId, TransactionKind};
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{StoreConfig, StoreError, TransactionStore};

/// PostgREST client for a Supabase-hosted `transactions` table.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
	client: reqwest::Client,
	endpoint: String,
	anon_key: String,
}

/// Error body PostgREST sends along with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct PostgrestError {
	message: Option<String>,
	details: Option<String>,
	hint: Option<String>,
}

/// Exactly the columns of the remote table. Advisories are not stored.
#[derive(Debug, Serialize)]
struct Row<'a> {
	id: &'a TransactionId,
	#[serde(rename = "type")]
	kind: TransactionKind,
	date: &'a NaiveDate,
	item: &'a str,
	person: &'a str,
	remarks: Option<&'a str>,
	photo: Option<&'a str>,
	timestamp: i64,
}

impl<'a> From<&'a Transaction> for Row<'a> {
	fn from(transaction: &'a Transaction) -> Self {
		Self {
			id: &transaction.id,
			kind: transaction.kind,
			date: &transaction.date,
			item: &transaction.item,
			person: &transaction.person,
			remarks: transaction.remarks.as_deref(),
			photo: transaction.photo.as_deref(),
			timestamp: transaction.timestamp,
		}
	}
}

#[derive(Debug, Deserialize)]
struct EchoedRow {
	id: TransactionId,
}

impl SupabaseStore {
	pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
		if config.url.trim().is_empty() || config.anon_key.trim().is_empty() {
			return Err(StoreError::NotConfigured);
		}

		let client = reqwest::Client::builder()
			.timeout(config.timeout)
			.build()
			.map_err(|e| StoreError::Request(e.to_string()))?;

		Ok(Self {
			client,
			endpoint: config.endpoint(),
			anon_key: config.anon_key,
		})
	}

	fn request(&self, method: Method) -> RequestBuilder {
		self.client
			.request(method, &self.endpoint)
			.header("apikey", &self.anon_key)
			.header("authorization", format!("Bearer {}", self.anon_key))
	}

	async fn send(request: RequestBuilder) -> Result<String, StoreError> {
		let response = request
			.send()
			.await
			.map_err(|e| StoreError::Request(e.to_string()))?;

		let response = check_status(response).await?;

		response
			.text()
			.await
			.map_err(|e| StoreError::Request(e.to_string()))
	}
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();
	let reason = rejection_reason(&body).unwrap_or_else(|| {
		status
			.canonical_reason()
			.unwrap_or("unknown error")
			.to_string()
	});

	Err(StoreError::Status {
		status: status.as_u16(),
		reason,
	})
}

/// Pulls a readable reason out of a PostgREST error body.
fn rejection_reason(body: &str) -> Option<String> {
	let error = serde_json::from_str::<PostgrestError>(body).ok()?;

	let parts = [error.message, error.details, error.hint]
		.into_iter()
		.flatten()
		.map(|part| part.trim().to_string())
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>();

	(!parts.is_empty()).then(|| parts.join(" - "))
}

/// Echoed rows of a `return=representation` write, checked for `id`.
fn confirm_echo(body: &str, id: &TransactionId) -> Result<bool, StoreError> {
	let rows = serde_json::from_str::<Vec<EchoedRow>>(body)
		.map_err(|e| StoreError::Decode(e.to_string()))?;

	Ok(rows.iter().any(|row| &row.id == id))
}

#[async_trait]
impl TransactionStore for SupabaseStore {
	async fn fetch_all(&self) -> Result<Vec<Transaction>, StoreError> {
		let body = Self::send(
			self.request(Method::GET)
				.query(&[("select", "*"), ("order", "timestamp.desc")]),
		)
		.await?;

		let transactions = serde_json::from_str::<Vec<Transaction>>(&body)
			.map_err(|e| StoreError::Decode(e.to_string()))?;

		debug!(count = transactions.len(), "Fetched transactions");

		Ok(transactions)
	}

	async fn insert(&self, transaction: &Transaction) -> Result<(), StoreError> {
		let body = Self::send(
			self.request(Method::POST)
				.header("prefer", "return=representation")
				.json(&[Row::from(transaction)]),
		)
		.await?;

		// An empty 2xx is not proof of a write; only the echoed row is.
		if !confirm_echo(&body, &transaction.id)? {
			warn!(id = %transaction.id, "Insert was acknowledged without echoing the row");
			return Err(StoreError::NotWritten(transaction.id.clone()));
		}

		debug!(id = %transaction.id, item = %transaction.item, "Inserted transaction");

		Ok(())
	}

	async fn delete_by_id(&self, id: &TransactionId) -> Result<(), StoreError> {
		let body = Self::send(
			self.request(Method::DELETE)
				.header("prefer", "return=representation")
				.query(&[("id", format!("eq.{id}"))]),
		)
		.await?;

		if !confirm_echo(&body, id)? {
			return Err(StoreError::NotFound(id.clone()));
		}

		debug!(%id, "Deleted transaction");

		Ok(())
	}
}
