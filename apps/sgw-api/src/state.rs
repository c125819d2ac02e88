use std::{collections::HashSet, sync::Arc};

use axum::http::{HeaderMap, HeaderName};

use sgw_config::Config;
use sgw_service::{GatewayService, Providers};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<GatewayService>,
	pub api_keys: Arc<ApiKeys>,
}
impl AppState {
	pub fn new(config: Config) -> color_eyre::Result<Self> {
		let providers = Providers::http(&config)?;

		Self::with_providers(config, providers)
	}

	pub fn with_providers(config: Config, providers: Providers) -> color_eyre::Result<Self> {
		let api_keys = ApiKeys::new(&config.security.api_key_header, &config.security.api_keys)?;
		let service = GatewayService::new(config, providers);

		Ok(Self { service: Arc::new(service), api_keys: Arc::new(api_keys) })
	}
}

/// Static credential allow-list, loaded once at startup.
pub struct ApiKeys {
	header: HeaderName,
	keys: HashSet<String>,
}
impl ApiKeys {
	pub fn new(header: &str, keys: &[String]) -> color_eyre::Result<Self> {
		let header = HeaderName::from_bytes(header.trim().as_bytes())?;

		Ok(Self { header, keys: keys.iter().cloned().collect() })
	}

	pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
		headers
			.get(&self.header)
			.and_then(|value| value.to_str().ok())
			.map(|value| self.keys.contains(value))
			.unwrap_or(false)
	}
}
