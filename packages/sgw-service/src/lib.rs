pub mod enrich;
pub mod error;
pub mod normalize;
pub mod query;
pub mod search;

pub use enrich::{MetadataPair, StorageUri};
pub use error::{Error, Result};
pub use normalize::{Document, ExtractiveSpan};
pub use query::SearchRequest;
pub use search::SearchResponse;
pub use sgw_providers::discovery::{RawResultEntry, SearchPage, SearchQueryConfig};

use std::{future::Future, pin::Pin, sync::Arc};

use reqwest::Client;
use serde_json::{Map, Value};

use sgw_config::{Config, SearchProviderConfig, StorageProviderConfig};
use sgw_providers::discovery;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		location: &'a str,
		request: &'a SearchQueryConfig,
	) -> BoxFuture<'a, color_eyre::Result<SearchPage>>;
}

pub trait MetadataProvider
where
	Self: Send + Sync,
{
	fn object_metadata<'a>(
		&'a self,
		cfg: &'a StorageProviderConfig,
		bucket: &'a str,
		object: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<Map<String, Value>>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub search: Arc<dyn SearchProvider>,
	pub metadata: Arc<dyn MetadataProvider>,
}
impl Providers {
	pub fn new(search: Arc<dyn SearchProvider>, metadata: Arc<dyn MetadataProvider>) -> Self {
		Self { search, metadata }
	}

	/// Providers backed by the real HTTP services, each with one client reused for the life of
	/// the process.
	pub fn http(cfg: &Config) -> color_eyre::Result<Self> {
		let search =
			HttpSearch { client: sgw_providers::http_client(cfg.providers.search.timeout_ms)? };
		let metadata =
			HttpMetadata { client: sgw_providers::http_client(cfg.providers.storage.timeout_ms)? };

		Ok(Self::new(Arc::new(search), Arc::new(metadata)))
	}
}

pub struct GatewayService {
	pub cfg: Config,
	pub providers: Providers,
}
impl GatewayService {
	pub fn new(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}

struct HttpSearch {
	client: Client,
}
impl SearchProvider for HttpSearch {
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		location: &'a str,
		request: &'a SearchQueryConfig,
	) -> BoxFuture<'a, color_eyre::Result<SearchPage>> {
		Box::pin(discovery::search(&self.client, cfg, location, request))
	}
}

struct HttpMetadata {
	client: Client,
}
impl MetadataProvider for HttpMetadata {
	fn object_metadata<'a>(
		&'a self,
		cfg: &'a StorageProviderConfig,
		bucket: &'a str,
		object: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<Map<String, Value>>>> {
		Box::pin(sgw_providers::storage::object_metadata(&self.client, cfg, bucket, object))
	}
}
