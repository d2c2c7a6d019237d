use base64::{engine::general_purpose::STANDARD, Engine};

/// Embeds raw image bytes as a `data:` URI, the form the `photo` column stores.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
	format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
