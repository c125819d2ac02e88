//! Client for the object-storage metadata RPC.

use color_eyre::{Result, eyre};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};

/// Fetches the custom metadata map of one object.
///
/// Returns `Ok(None)` when the object exists but carries no custom metadata. A missing object
/// is an error.
pub async fn object_metadata(
	client: &Client,
	cfg: &sgw_config::StorageProviderConfig,
	bucket: &str,
	object: &str,
) -> Result<Option<Map<String, Value>>> {
	let url = object_url(&cfg.api_base, bucket, object);

	tracing::debug!(%bucket, %object, "Fetching object metadata.");

	let token =
		crate::bearer_token(cfg.access_token.as_deref(), cfg.access_token_file.as_deref()).await?;
	let res = client
		.get(url)
		.headers(crate::auth_headers(token.as_deref(), &cfg.default_headers)?)
		.send()
		.await?;

	if res.status() == StatusCode::NOT_FOUND {
		return Err(eyre::eyre!("Object {object} not found in bucket {bucket}."));
	}

	let json: Value = res.error_for_status()?.json().await?;

	parse_object_metadata(json)
}

fn object_url(api_base: &str, bucket: &str, object: &str) -> String {
	format!(
		"{}/storage/v1/b/{}/o/{}",
		api_base.trim_end_matches('/'),
		urlencoding::encode(bucket),
		urlencoding::encode(object)
	)
}

fn parse_object_metadata(json: Value) -> Result<Option<Map<String, Value>>> {
	let Value::Object(mut resource) = json else {
		return Err(eyre::eyre!("Object resource must be a JSON object."));
	};

	match resource.remove("metadata") {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Object(metadata)) => Ok(Some(metadata)),
		Some(_) => Err(eyre::eyre!("Object metadata must be a JSON object.")),
	}
}
