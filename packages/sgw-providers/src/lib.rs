pub mod discovery;
pub mod storage;

use std::{path::Path, time::Duration};

use color_eyre::{Result, eyre};
use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

/// Builds the long-lived HTTP client shared by every call to one provider.
pub fn http_client(timeout_ms: u64) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(timeout_ms)).build()?)
}

/// Resolves the bearer token for one call, preferring the inline token. A token file is read
/// fresh each time and must not be blank.
pub async fn bearer_token(
	access_token: Option<&str>,
	access_token_file: Option<&Path>,
) -> Result<Option<String>> {
	if let Some(token) = access_token {
		return Ok(Some(token.to_string()));
	}

	let Some(path) = access_token_file else {
		return Ok(None);
	};
	let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
		eyre::eyre!("Failed to read access token file {}: {err}", path.display())
	})?;
	let token = raw.trim();

	if token.is_empty() {
		return Err(eyre::eyre!("Access token file {} is empty.", path.display()));
	}

	Ok(Some(token.to_string()))
}

pub fn auth_headers(
	access_token: Option<&str>,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(token) = access_token {
		headers.insert(AUTHORIZATION, format!("Bearer {token}").parse()?);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Default header values must be strings."));
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
