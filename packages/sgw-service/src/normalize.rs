//! Projection of one raw result entry into a [`Document`].
//!
//! Every field is extracted on its own and resolves to `None` when the payload is missing or
//! shaped unexpectedly. A bad field never affects its siblings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sgw_config::{Features, Output};

use crate::enrich::MetadataPair;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub title: Option<String>,
	pub link: Option<String>,
	pub snippets: Option<Vec<String>>,
	pub extractive_answers: Option<Vec<ExtractiveSpan>>,
	pub extractive_segments: Option<Vec<ExtractiveSpan>>,
	pub metadata: Option<Vec<MetadataPair>>,
}
impl Document {
	pub fn with_metadata(self, metadata: Option<Vec<MetadataPair>>) -> Self {
		Self { metadata, ..self }
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractiveSpan {
	pub content: Option<String>,
	pub page_number: Option<u32>,
}

/// Normalizes the `derivedStructData` map of one hit. Metadata is left unset; the enricher
/// fills it in afterwards.
pub fn normalize_document(derived: &Value, features: &Features, output: &Output) -> Document {
	let link = extract_string(derived, "link").map(|link| match output.path_override.as_deref() {
		Some(path) => rewrite_link(&link, &output.protocol, path),
		None => link,
	});

	Document {
		title: extract_string(derived, "title"),
		link,
		snippets: extract_snippets(derived),
		extractive_answers: features
			.extractive_answers
			.then(|| extract_spans(derived, "extractive_answers"))
			.flatten(),
		extractive_segments: features
			.extractive_segments
			.then(|| extract_spans(derived, "extractive_segments"))
			.flatten(),
		metadata: None,
	}
}

/// Points a link at `{protocol}://{path}/{basename}`.
pub fn rewrite_link(link: &str, protocol: &str, path: &str) -> String {
	let basename = link.rsplit('/').next().unwrap_or(link);
	let path = path.trim_matches('/');

	format!("{protocol}://{path}/{basename}")
}

fn extract_string(derived: &Value, key: &str) -> Option<String> {
	derived.get(key)?.as_str().map(str::to_string)
}

// One malformed sub-entry drops the whole field.
fn extract_snippets(derived: &Value) -> Option<Vec<String>> {
	derived
		.get("snippets")?
		.as_array()?
		.iter()
		.map(|entry| entry.get("snippet")?.as_str().map(str::to_string))
		.collect()
}

fn extract_spans(derived: &Value, key: &str) -> Option<Vec<ExtractiveSpan>> {
	derived.get(key)?.as_array()?.iter().map(|entry| entry.as_object().map(extract_span)).collect()
}

fn extract_span(entry: &Map<String, Value>) -> ExtractiveSpan {
	ExtractiveSpan {
		content: entry.get("content").and_then(Value::as_str).map(str::to_string),
		page_number: entry.get("pageNumber").and_then(extract_page_number),
	}
}

// The service reports page numbers as either integers or numeric strings.
fn extract_page_number(value: &Value) -> Option<u32> {
	match value {
		Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
		Value::String(raw) => raw.trim().parse().ok(),
		_ => None,
	}
}
