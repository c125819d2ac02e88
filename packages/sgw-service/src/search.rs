use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::{Document, Error, GatewayService, Result, SearchRequest, enrich, normalize, query};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
	pub summary: Option<String>,
	pub documents: Vec<Document>,
}

pub fn assemble_response(summary: Option<String>, documents: Vec<Document>) -> SearchResponse {
	SearchResponse { summary, documents }
}

impl GatewayService {
	/// Runs one search against `data_store`, or the configured default data store when `None`.
	///
	/// Only a failed search call surfaces as an error. Field and metadata failures degrade to
	/// absent values on the affected document.
	pub async fn search(
		&self,
		data_store: Option<&str>,
		request: SearchRequest,
	) -> Result<SearchResponse> {
		let trace_id = Uuid::new_v4();
		let span = tracing::info_span!("search", %trace_id);

		self.search_inner(data_store, request).instrument(span).await
	}

	async fn search_inner(
		&self,
		data_store: Option<&str>,
		request: SearchRequest,
	) -> Result<SearchResponse> {
		let deployment = &self.cfg.deployment;
		let features = &self.cfg.features;
		let data_store = query::resolve_data_store(deployment, data_store)?;
		let config = query::build_search_config(deployment, features, data_store, &request);
		let search_cfg = &self.cfg.providers.search;
		let call = self.providers.search.search(search_cfg, &deployment.location, &config);
		let page = tokio::time::timeout(Duration::from_millis(search_cfg.timeout_ms), call)
			.await
			.map_err(|_| Error::ExternalService {
				message: format!("Search call timed out after {} ms.", search_cfg.timeout_ms),
			})??;

		tracing::info!(
			data_store,
			results = page.results.len(),
			has_summary = page.summary.is_some(),
			"Search call completed."
		);

		let documents = page
			.results
			.iter()
			.map(|entry| {
				normalize::normalize_document(
					&entry.derived_struct_data,
					features,
					&self.cfg.output,
				)
			})
			.collect::<Vec<_>>();
		let documents = if features.metadata_enrichment {
			let links =
				documents.iter().map(|document| document.link.as_deref()).collect::<Vec<_>>();
			let metadata = enrich::enrich_links(
				self.providers.metadata.as_ref(),
				&self.cfg.providers.storage,
				&links,
			)
			.await;

			documents
				.into_iter()
				.zip(metadata)
				.map(|(document, metadata)| document.with_metadata(metadata))
				.collect()
		} else {
			documents
		};

		Ok(assemble_response(page.summary, documents))
	}
}
