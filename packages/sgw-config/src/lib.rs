mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Deployment, Features, Output, Providers, SearchProviderConfig, Security, Service,
	StorageProviderConfig,
};

use std::{env, fs, net::SocketAddr, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	load_with_env(path, |name| env::var(name).ok())
}

pub fn load_with_env<F>(path: &Path, lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	overlay_env(&mut cfg, lookup)?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Applies deployment overrides from the process environment.
///
/// `lookup` resolves a variable name to its value; unset variables are skipped. `API_KEY` is
/// appended to the allow-list rather than replacing it.
pub fn overlay_env<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(project_id) = lookup("GOOGLE_CLOUD_PROJECT") {
		cfg.deployment.project_id = project_id;
	}
	if let Some(location) = lookup("DATA_STORE_LOCATION") {
		cfg.deployment.location = location;
	}
	if let Some(data_store_id) = lookup("DATA_STORE_ID") {
		cfg.deployment.data_store_id = Some(data_store_id);
	}
	if let Some(api_key) = lookup("API_KEY") {
		cfg.security.api_keys.push(api_key);
	}
	if let Some(path) = lookup("OUTPUT_PATH_OVERRIDE") {
		cfg.output.path_override = Some(path);
	}
	if let Some(protocol) = lookup("OUTPUT_PROTOCOL") {
		cfg.output.protocol = protocol;
	}
	if let Some(flag) = lookup("ENABLE_EXTRACTIVE_ANSWERS") {
		cfg.features.extractive_answers = parse_flag("ENABLE_EXTRACTIVE_ANSWERS", &flag)?;
	}
	if let Some(flag) = lookup("ENABLE_EXTRACTIVE_SEGMENTS") {
		cfg.features.extractive_segments = parse_flag("ENABLE_EXTRACTIVE_SEGMENTS", &flag)?;
	}
	if let Some(port) = lookup("PORT") {
		let port: u16 = port.trim().parse().map_err(|_| Error::Environment {
			name: "PORT".to_string(),
			message: format!("{port:?} is not a valid port number."),
		})?;
		let mut addr: SocketAddr = cfg.service.http_bind.parse().map_err(|_| Error::Validation {
			message: "service.http_bind must be a valid socket address.".to_string(),
		})?;

		addr.set_port(port);

		cfg.service.http_bind = addr.to_string();
	}

	Ok(())
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: "service.http_bind must be a valid socket address.".to_string(),
		});
	}

	for (label, value) in [
		("deployment.project_id", &cfg.deployment.project_id),
		("deployment.location", &cfg.deployment.location),
		("deployment.serving_config", &cfg.deployment.serving_config),
		("output.protocol", &cfg.output.protocol),
		("security.api_key_header", &cfg.security.api_key_header),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.security.api_keys.is_empty() {
		return Err(Error::Validation {
			message: "security.api_keys must contain at least one key.".to_string(),
		});
	}
	if cfg.security.api_keys.iter().any(|key| key.trim().is_empty()) {
		return Err(Error::Validation {
			message: "security.api_keys entries must be non-empty.".to_string(),
		});
	}
	if cfg.providers.search.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.search.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.storage.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.storage.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.storage.max_concurrency == 0 {
		return Err(Error::Validation {
			message: "providers.storage.max_concurrency must be greater than zero.".to_string(),
		});
	}

	for (label, token, token_file) in [
		(
			"providers.search",
			&cfg.providers.search.access_token,
			&cfg.providers.search.access_token_file,
		),
		(
			"providers.storage",
			&cfg.providers.storage.access_token,
			&cfg.providers.storage.access_token_file,
		),
	] {
		if token.is_some() && token_file.is_some() {
			return Err(Error::Validation {
				message: format!(
					"{label} must set at most one of access_token and access_token_file."
				),
			});
		}
	}

	for (label, headers) in [
		("providers.search", &cfg.providers.search.default_headers),
		("providers.storage", &cfg.providers.storage.default_headers),
	] {
		if headers.values().any(|value| !value.is_string()) {
			return Err(Error::Validation {
				message: format!("{label}.default_headers values must be strings."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.deployment.data_store_id.as_deref().map(|id| id.trim().is_empty()).unwrap_or(false) {
		cfg.deployment.data_store_id = None;
	}
	if cfg.output.path_override.as_deref().map(|path| path.trim().is_empty()).unwrap_or(false) {
		cfg.output.path_override = None;
	}
	if cfg.providers.search.api_base.as_deref().map(|base| base.trim().is_empty()).unwrap_or(false)
	{
		cfg.providers.search.api_base = None;
	}

	for token in [&mut cfg.providers.search.access_token, &mut cfg.providers.storage.access_token]
	{
		if token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false) {
			*token = None;
		}
	}

	cfg.output.protocol = cfg.output.protocol.trim().to_lowercase();
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(Error::Environment {
			name: name.to_string(),
			message: format!("{raw:?} is not a boolean flag."),
		}),
	}
}
