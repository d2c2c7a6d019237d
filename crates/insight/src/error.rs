use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsightError {
	#[error("insight generator is not configured")]
	NotConfigured,
	#[error("insight request failed: {0}")]
	Request(String),
	#[error("insight generator answered with status {status}: {body}")]
	Status { status: u16, body: String },
	#[error("insight generator returned no text")]
	EmptyResponse,
	#[error("no usable advisory in generator output: {0:?}")]
	Malformed(String),
}
