use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::Clock;

/// Client-generated identifier of a [`Transaction`], stable for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
	pub fn new() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Default for TransactionId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for TransactionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for TransactionId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<&str> for TransactionId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl AsRef<str> for TransactionId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Whether an event hands an item out or brings it back.
///
/// The wire names are the ones the deployed table already holds.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransactionKind {
	#[serde(rename = "Ausleihe", alias = "LOAN", alias = "Loan", alias = "loan")]
	Loan,
	#[serde(rename = "Rückgabe", alias = "RETURN", alias = "Return", alias = "return")]
	Return,
}

/// Advisory tips attached at creation time. Informational only, never read by reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub safety_note: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quick_guide: Option<String>,
}

impl Advisory {
	pub fn is_empty(&self) -> bool {
		self.category.is_none() && self.safety_note.is_none() && self.quick_guide.is_none()
	}

	/// `None` when no field carries any text.
	pub fn non_empty(self) -> Option<Self> {
		(!self.is_empty()).then_some(self)
	}
}

/// One recorded loan or return event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	pub id: TransactionId,
	#[serde(rename = "type")]
	pub kind: TransactionKind,
	/// User-asserted date of the action. Editable, so never used for ordering.
	#[serde(deserialize_with = "date_prefix")]
	pub date: NaiveDate,
	/// Reconciliation key, compared byte for byte.
	pub item: String,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub person: String,
	#[serde(default)]
	pub remarks: Option<String>,
	#[serde(default)]
	pub photo: Option<String>,
	/// Creation instant in milliseconds since the epoch. The only ordering key.
	pub timestamp: i64,
	/// Shown when the event is recorded. The remote table has no column for it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub advisory: Option<Advisory>,
}

impl Transaction {
	pub fn is_loan(&self) -> bool {
		self.kind == TransactionKind::Loan
	}
}

/// User input for a new event, before the client assigns `id` and `timestamp`.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
	pub kind: TransactionKind,
	pub item: String,
	pub person: String,
	pub date: NaiveDate,
	pub remarks: Option<String>,
	pub photo: Option<String>,
	pub advisory: Option<Advisory>,
}

impl TransactionDraft {
	/// Dated today in local time, like the entry form defaults to.
	pub fn new(kind: TransactionKind, item: impl Into<String>, person: impl Into<String>) -> Self {
		Self {
			kind,
			item: item.into(),
			person: person.into(),
			date: Local::now().date_naive(),
			remarks: None,
			photo: None,
			advisory: None,
		}
	}

	pub fn with_date(mut self, date: NaiveDate) -> Self {
		self.date = date;
		self
	}

	pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
		let remarks = remarks.into();
		self.remarks = (!remarks.trim().is_empty()).then_some(remarks);
		self
	}

	pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
		self.photo = Some(photo.into());
		self
	}

	pub fn with_advisory(mut self, advisory: Option<Advisory>) -> Self {
		self.advisory = advisory.and_then(Advisory::non_empty);
		self
	}

	pub fn into_transaction(self, clock: &Clock) -> Transaction {
		Transaction {
			id: TransactionId::new(),
			kind: self.kind,
			date: self.date,
			item: self.item,
			person: self.person,
			remarks: self.remarks,
			photo: self.photo,
			timestamp: clock.now_millis(),
			advisory: self.advisory,
		}
	}
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Accepts `YYYY-MM-DD` as well as full ISO timestamps older rows were written with.
fn date_prefix<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
	let raw = String::deserialize(deserializer)?;
	let day = raw.get(..10).unwrap_or(&raw);

	NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}
