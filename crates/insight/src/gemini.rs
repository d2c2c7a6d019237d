use std::time::Duration;

use async_trait::async_trait;
use gl_ledger::Advisory;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{extract::parse_advisory, InsightError, InsightProvider};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
	pub api_key: String,
	pub model: String,
	pub base_url: String,
	pub timeout: Duration,
}

impl GeminiConfig {
	pub fn new(api_key: impl Into<String>) -> Self {
		Self {
			api_key: api_key.into(),
			model: DEFAULT_MODEL.to_string(),
			base_url: DEFAULT_BASE_URL.to_string(),
			timeout: DEFAULT_TIMEOUT,
		}
	}

	pub fn with_model(mut self, model: impl Into<String>) -> Self {
		self.model = model.into();
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	fn endpoint(&self) -> String {
		format!(
			"{}/v1beta/models/{}:generateContent",
			self.base_url.trim_end_matches('/'),
			self.model
		)
	}
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
	content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
	#[serde(default)]
	parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
	text: Option<String>,
}

/// Gemini `generateContent` client asking for one structured tip per item.
#[derive(Debug, Clone)]
pub struct GeminiClient {
	client: reqwest::Client,
	endpoint: String,
	api_key: String,
}

impl GeminiClient {
	pub fn new(config: GeminiConfig) -> Result<Self, InsightError> {
		let api_key = config.api_key.trim();
		// build tooling used to inline a literal "undefined" for unset keys
		if api_key.is_empty() || api_key == "undefined" {
			return Err(InsightError::NotConfigured);
		}

		let client = reqwest::Client::builder()
			.timeout(config.timeout)
			.build()
			.map_err(|e| InsightError::Request(e.to_string()))?;

		Ok(Self {
			client,
			endpoint: config.endpoint(),
			api_key: api_key.to_string(),
		})
	}

	pub async fn generate(&self, item: &str) -> Result<Advisory, InsightError> {
		let response = self
			.client
			.post(&self.endpoint)
			.header("x-goog-api-key", &self.api_key)
			.json(&request_body(item))
			.send()
			.await
			.map_err(|e| InsightError::Request(e.to_string()))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| InsightError::Request(e.to_string()))?;

		if !status.is_success() {
			return Err(InsightError::Status {
				status: status.as_u16(),
				body,
			});
		}

		let text = response_text(&body).ok_or(InsightError::EmptyResponse)?;

		parse_advisory(&text).ok_or(InsightError::Malformed(text))
	}
}

#[async_trait]
impl InsightProvider for GeminiClient {
	async fn insight(&self, item: &str) -> Option<Advisory> {
		match self.generate(item).await {
			Ok(advisory) => {
				debug!(%item, "Generated advisory");
				Some(advisory)
			}
			Err(e @ InsightError::Malformed(_)) => {
				debug!(%item, "{e}");
				None
			}
			Err(e) => {
				warn!(%item, "{e}");
				None
			}
		}
	}
}

fn prompt(item: &str) -> String {
	format!(
		"You advise a film crew that shares technical equipment. For the item \"{item}\", \
		answer with a category (one or two words), a short safety note and a quick handling \
		guide of at most 15 words that keeps the equipment in good shape on set. Address the \
		reader directly and answer in the language of the item name."
	)
}

fn request_body(item: &str) -> Value {
	json!({
		"contents": [{ "parts": [{ "text": prompt(item) }] }],
		"generationConfig": {
			"responseMimeType": "application/json",
			"responseSchema": {
				"type": "OBJECT",
				"properties": {
					"category": { "type": "STRING" },
					"safetyNote": { "type": "STRING" },
					"quickGuide": { "type": "STRING" }
				},
				"required": ["category", "safetyNote", "quickGuide"]
			}
		}
	})
}

/// Concatenated text parts of the first candidate.
fn response_text(body: &str) -> Option<String> {
	let response = serde_json::from_str::<GenerateResponse>(body).ok()?;

	let text = response
		.candidates
		.into_iter()
		.next()?
		.content?
		.parts
		.into_iter()
		.filter_map(|part| part.text)
		.collect::<String>();

	(!text.trim().is_empty()).then_some(text)
}
