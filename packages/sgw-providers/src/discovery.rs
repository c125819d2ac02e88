//! Client for the managed search `:search` RPC.

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// The request body sent to the search RPC. Built once per client query and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryConfig {
	pub serving_config: String,
	pub query: String,
	pub language_code: String,
	pub page_size: i32,
	pub content_search_spec: ContentSearchSpec,
	pub query_expansion_spec: QueryExpansionSpec,
	pub spell_correction_spec: SpellCorrectionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSearchSpec {
	pub snippet_spec: SnippetSpec,
	pub summary_spec: SummarySpec,
	pub extractive_content_spec: ExtractiveContentSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetSpec {
	pub return_snippet: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySpec {
	pub summary_result_count: i32,
	pub include_citations: bool,
	pub ignore_adversarial_query: bool,
	pub ignore_non_summary_seeking_query: bool,
	pub model_spec: ModelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpec {
	pub version: String,
}

/// A count left as `None` is omitted from the body, which disables that extractive kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractiveContentSpec {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_extractive_answer_count: Option<i32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_extractive_segment_count: Option<i32>,
	pub return_extractive_segment_score: bool,
	pub num_previous_segments: i32,
	pub num_next_segments: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryExpansionSpec {
	pub condition: QueryExpansionCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryExpansionCondition {
	Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellCorrectionSpec {
	pub mode: SpellCorrectionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpellCorrectionMode {
	Auto,
}

/// One page returned by the search RPC.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
	pub results: Vec<RawResultEntry>,
	pub summary: Option<String>,
}

/// A single hit. `derived_struct_data` is kept loosely typed; it is `Value::Null` when the hit
/// carries no derived data at all.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResultEntry {
	pub derived_struct_data: Value,
}

pub fn endpoint(location: &str) -> String {
	if location == "global" {
		"https://discoveryengine.googleapis.com".to_string()
	} else {
		format!("https://{location}-discoveryengine.googleapis.com")
	}
}

pub fn serving_config_path(
	project: &str,
	location: &str,
	data_store: &str,
	serving_config: &str,
) -> String {
	format!(
		"projects/{project}/locations/{location}/collections/default_collection/dataStores/{data_store}/servingConfigs/{serving_config}"
	)
}

pub async fn search(
	client: &Client,
	cfg: &sgw_config::SearchProviderConfig,
	location: &str,
	request: &SearchQueryConfig,
) -> Result<SearchPage> {
	let api_base = cfg.api_base.clone().unwrap_or_else(|| endpoint(location));
	let url = format!("{}/v1/{}:search", api_base.trim_end_matches('/'), request.serving_config);

	tracing::debug!(%url, page_size = request.page_size, "Sending search request.");

	let token =
		crate::bearer_token(cfg.access_token.as_deref(), cfg.access_token_file.as_deref()).await?;
	let res = client
		.post(url)
		.headers(crate::auth_headers(token.as_deref(), &cfg.default_headers)?)
		.json(request)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json)
}

fn parse_search_response(json: Value) -> Result<SearchPage> {
	if !json.is_object() {
		return Err(eyre::eyre!("Search response must be a JSON object."));
	}

	// The service omits `results` entirely when nothing matched.
	let results = match json.get("results") {
		None | Some(Value::Null) => Vec::new(),
		Some(Value::Array(items)) => items.iter().map(parse_result_entry).collect(),
		Some(_) => return Err(eyre::eyre!("Search response results must be an array.")),
	};
	let summary = json
		.get("summary")
		.and_then(|summary| summary.get("summaryText"))
		.and_then(Value::as_str)
		.map(str::to_string);

	Ok(SearchPage { results, summary })
}

fn parse_result_entry(item: &Value) -> RawResultEntry {
	let derived_struct_data = item
		.get("document")
		.and_then(|document| document.get("derivedStructData"))
		.cloned()
		.unwrap_or(Value::Null);

	RawResultEntry { derived_struct_data }
}
