use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub deployment: Deployment,
	#[serde(default)]
	pub features: Features,
	#[serde(default)]
	pub output: Output,
	pub providers: Providers,
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
	pub project_id: String,
	pub location: String,
	/// Optional. Used when a search request does not name a data store in its path.
	pub data_store_id: Option<String>,
	#[serde(default = "default_serving_config")]
	pub serving_config: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Features {
	#[serde(default = "default_true")]
	pub extractive_answers: bool,
	#[serde(default = "default_true")]
	pub extractive_segments: bool,
	#[serde(default = "default_true")]
	pub metadata_enrichment: bool,
}
impl Default for Features {
	fn default() -> Self {
		Self { extractive_answers: true, extractive_segments: true, metadata_enrichment: true }
	}
}

/// Rewrites result links to `{protocol}://{path_override}/{basename}` when a path override is
/// set.
#[derive(Debug, Clone, Deserialize)]
pub struct Output {
	pub path_override: Option<String>,
	#[serde(default = "default_protocol")]
	pub protocol: String,
}
impl Default for Output {
	fn default() -> Self {
		Self { path_override: None, protocol: default_protocol() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub search: SearchProviderConfig,
	pub storage: StorageProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchProviderConfig {
	/// Optional. Derived from `deployment.location` when unset.
	pub api_base: Option<String>,
	pub access_token: Option<String>,
	/// Re-read on every call. Access tokens are short-lived; keep this file refreshed externally.
	pub access_token_file: Option<PathBuf>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageProviderConfig {
	#[serde(default = "default_storage_api_base")]
	pub api_base: String,
	pub access_token: Option<String>,
	pub access_token_file: Option<PathBuf>,
	pub timeout_ms: u64,
	#[serde(default = "default_max_concurrency")]
	pub max_concurrency: usize,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	#[serde(default = "default_api_key_header")]
	pub api_key_header: String,
	#[serde(default)]
	pub api_keys: Vec<String>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_serving_config() -> String {
	"default_config".to_string()
}

fn default_true() -> bool {
	true
}

fn default_protocol() -> String {
	"gs".to_string()
}

fn default_storage_api_base() -> String {
	"https://storage.googleapis.com".to_string()
}

fn default_max_concurrency() -> usize {
	4
}

fn default_api_key_header() -> String {
	"X-API-Key".to_string()
}
