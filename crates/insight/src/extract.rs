//! Defensive parsing of generator output.
//!
//! Models asked for JSON still wrap it in prose or code fences now and then, and
//! older prompts answered with a single `handlingTip` field. All of that is accepted.

use gl_ledger::Advisory;
use serde_json::{Map, Value};

const CATEGORY_KEYS: &[&str] = &["category", "kategorie"];
const SAFETY_NOTE_KEYS: &[&str] = &["safetyNote", "safety_note", "safety"];
const QUICK_GUIDE_KEYS: &[&str] = &["quickGuide", "quick_guide", "handlingTip", "handling_tip", "tip"];

/// Extracts an [`Advisory`] from raw generator text, `None` if nothing usable is in there.
pub fn parse_advisory(text: &str) -> Option<Advisory> {
	let value = serde_json::from_str::<Value>(text.trim())
		.ok()
		.or_else(|| embedded_object(text))?;

	let object = match value {
		Value::Object(object) => object,
		Value::Array(values) => values.into_iter().find_map(|value| match value {
			Value::Object(object) => Some(object),
			_ => None,
		})?,
		_ => return None,
	};

	Advisory {
		category: field(&object, CATEGORY_KEYS),
		safety_note: field(&object, SAFETY_NOTE_KEYS),
		quick_guide: field(&object, QUICK_GUIDE_KEYS),
	}
	.non_empty()
}

/// The outermost `{...}` in `text`, parsed.
fn embedded_object(text: &str) -> Option<Value> {
	let start = text.find('{')?;
	let end = text.rfind('}')?;

	(start < end)
		.then(|| serde_json::from_str(&text[start..=end]).ok())
		.flatten()
}

fn field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
	keys.iter()
		.filter_map(|key| object.get(*key))
		.filter_map(Value::as_str)
		.map(str::trim)
		.find(|value| !value.is_empty())
		.map(str::to_string)
}
