use std::{sync::LazyLock, time::Duration};

use futures::{StreamExt, stream};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sgw_config::StorageProviderConfig;

use crate::MetadataProvider;

const STORAGE_URI_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9+.\-]*://([^/]+)/(.+)$";

static STORAGE_URI: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(STORAGE_URI_PATTERN).ok());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
	pub key: Option<String>,
	pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUri<'a> {
	pub bucket: &'a str,
	pub object: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
	#[error("Document has no link.")]
	MissingLink,
	#[error("Invalid storage URI: {uri}")]
	InvalidUri { uri: String },
	#[error("Metadata lookup failed: {message}")]
	Lookup { message: String },
	#[error("Metadata lookup timed out after {timeout_ms} ms.")]
	Timeout { timeout_ms: u64 },
	#[error("Object has no custom metadata.")]
	NoMetadata,
}

pub fn parse_storage_uri(uri: &str) -> Result<StorageUri<'_>, EnrichError> {
	let captures = STORAGE_URI
		.as_ref()
		.and_then(|re| re.captures(uri))
		.ok_or_else(|| EnrichError::InvalidUri { uri: uri.to_string() })?;
	let (_, [bucket, object]) = captures.extract();

	Ok(StorageUri { bucket, object })
}

/// Keeps the provider's iteration order. Non-string values resolve to an absent value.
pub fn project_metadata(metadata: &Map<String, Value>) -> Vec<MetadataPair> {
	metadata
		.iter()
		.map(|(key, value)| MetadataPair {
			key: Some(key.clone()),
			value: value.as_str().map(str::to_string),
		})
		.collect()
}

pub async fn lookup_metadata(
	provider: &dyn MetadataProvider,
	cfg: &StorageProviderConfig,
	link: Option<&str>,
) -> Result<Vec<MetadataPair>, EnrichError> {
	let link = link.ok_or(EnrichError::MissingLink)?;
	let uri = parse_storage_uri(link)?;
	let lookup = provider.object_metadata(cfg, uri.bucket, uri.object);
	let metadata = tokio::time::timeout(Duration::from_millis(cfg.timeout_ms), lookup)
		.await
		.map_err(|_| EnrichError::Timeout { timeout_ms: cfg.timeout_ms })?
		.map_err(|err| EnrichError::Lookup { message: err.to_string() })?
		.ok_or(EnrichError::NoMetadata)?;

	Ok(project_metadata(&metadata))
}

/// Resolves metadata for one document, absorbing every failure into `None`.
pub async fn enrich_link(
	provider: &dyn MetadataProvider,
	cfg: &StorageProviderConfig,
	link: Option<&str>,
) -> Option<Vec<MetadataPair>> {
	match lookup_metadata(provider, cfg, link).await {
		Ok(pairs) => Some(pairs),
		Err(err @ (EnrichError::MissingLink | EnrichError::NoMetadata)) => {
			tracing::debug!(error = %err, "Metadata unavailable.");

			None
		},
		Err(err) => {
			tracing::warn!(
				error = %err,
				link = link.unwrap_or_default(),
				"Metadata enrichment failed."
			);

			None
		},
	}
}

/// Enriches every link with at most `cfg.max_concurrency` lookups in flight. Output position
/// `i` always belongs to input link `i`.
///
/// Lookups complete in any order, so a slow link only holds its own slot.
pub async fn enrich_links(
	provider: &dyn MetadataProvider,
	cfg: &StorageProviderConfig,
	links: &[Option<&str>],
) -> Vec<Option<Vec<MetadataPair>>> {
	let mut enriched = vec![None; links.len()];
	let lookups: Vec<_> = links
		.iter()
		.enumerate()
		.map(|(index, link)| async move { (index, enrich_link(provider, cfg, *link).await) })
		.collect();
	let mut lookups = stream::iter(lookups).buffer_unordered(cfg.max_concurrency.max(1));

	while let Some((index, metadata)) = lookups.next().await {
		enriched[index] = metadata;
	}

	enriched
}
