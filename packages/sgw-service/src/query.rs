use serde::{Deserialize, Serialize};

use sgw_config::{Deployment, Features};
use sgw_providers::discovery::{
	self, ContentSearchSpec, ExtractiveContentSpec, ModelSpec, QueryExpansionCondition,
	QueryExpansionSpec, SearchQueryConfig, SnippetSpec, SpellCorrectionMode, SpellCorrectionSpec,
	SummarySpec,
};

use crate::{Error, Result};

pub const SUMMARY_MODEL_VERSION: &str = "stable";

/// Client parameters for one search. Numeric tunables are passed through unchecked; the search
/// service rejects values it does not accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
	pub query: String,
	pub language_code: String,
	#[serde(default = "default_summary_result_count")]
	pub summary_result_count: i32,
	#[serde(default)]
	pub include_citations: bool,
	#[serde(default = "default_true")]
	pub ignore_adversarial_query: bool,
	#[serde(default = "default_true")]
	pub ignore_non_summary_seeking_query: bool,
	#[serde(default = "default_true")]
	pub return_snippet: bool,
	#[serde(default = "default_true")]
	pub return_extractive_segment_score: bool,
	#[serde(default = "default_max_extractive_count")]
	pub max_extractive_answer_count: i32,
	#[serde(default = "default_max_extractive_count")]
	pub max_extractive_segment_count: i32,
	#[serde(default)]
	pub num_previous_segments: i32,
	#[serde(default)]
	pub num_next_segments: i32,
	#[serde(default = "default_page_size")]
	pub page_size: i32,
}
impl SearchRequest {
	pub fn new(query: impl Into<String>, language_code: impl Into<String>) -> Self {
		Self {
			query: query.into(),
			language_code: language_code.into(),
			summary_result_count: default_summary_result_count(),
			include_citations: false,
			ignore_adversarial_query: true,
			ignore_non_summary_seeking_query: true,
			return_snippet: true,
			return_extractive_segment_score: true,
			max_extractive_answer_count: default_max_extractive_count(),
			max_extractive_segment_count: default_max_extractive_count(),
			num_previous_segments: 0,
			num_next_segments: 0,
			page_size: default_page_size(),
		}
	}
}

/// Picks the data store named in the request path, falling back to the deployment default.
pub fn resolve_data_store<'a>(
	deployment: &'a Deployment,
	requested: Option<&'a str>,
) -> Result<&'a str> {
	requested
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.or(deployment.data_store_id.as_deref())
		.ok_or_else(|| Error::InvalidRequest {
			message: "No data store was given and no default data store is configured."
				.to_string(),
		})
}

pub fn build_search_config(
	deployment: &Deployment,
	features: &Features,
	data_store: &str,
	request: &SearchRequest,
) -> SearchQueryConfig {
	let serving_config = discovery::serving_config_path(
		&deployment.project_id,
		&deployment.location,
		data_store,
		&deployment.serving_config,
	);

	SearchQueryConfig {
		serving_config,
		query: request.query.clone(),
		language_code: request.language_code.clone(),
		page_size: request.page_size,
		content_search_spec: ContentSearchSpec {
			snippet_spec: SnippetSpec { return_snippet: request.return_snippet },
			summary_spec: SummarySpec {
				summary_result_count: request.summary_result_count,
				include_citations: request.include_citations,
				ignore_adversarial_query: request.ignore_adversarial_query,
				ignore_non_summary_seeking_query: request.ignore_non_summary_seeking_query,
				model_spec: ModelSpec { version: SUMMARY_MODEL_VERSION.to_string() },
			},
			extractive_content_spec: ExtractiveContentSpec {
				max_extractive_answer_count: features
					.extractive_answers
					.then_some(request.max_extractive_answer_count),
				max_extractive_segment_count: features
					.extractive_segments
					.then_some(request.max_extractive_segment_count),
				return_extractive_segment_score: request.return_extractive_segment_score,
				num_previous_segments: request.num_previous_segments,
				num_next_segments: request.num_next_segments,
			},
		},
		query_expansion_spec: QueryExpansionSpec { condition: QueryExpansionCondition::Auto },
		spell_correction_spec: SpellCorrectionSpec { mode: SpellCorrectionMode::Auto },
	}
}

fn default_summary_result_count() -> i32 {
	3
}

fn default_true() -> bool {
	true
}

fn default_max_extractive_count() -> i32 {
	3
}

fn default_page_size() -> i32 {
	3
}
