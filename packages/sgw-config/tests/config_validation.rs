use std::{
	collections::HashMap,
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use sgw_config::Error;

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_temp_config(payload: &str) -> PathBuf {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be after the Unix epoch.")
		.as_nanos();
	let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
	let path = env::temp_dir().join(format!("sgw_config_test_{nanos}_{seq}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn sample_with<F>(edit: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	edit(root);

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn section<'a>(root: &'a mut toml::Table, name: &str) -> &'a mut toml::Table {
	root.get_mut(name)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Sample config must include [{name}]."))
}

fn load_without_env(payload: &str) -> sgw_config::Result<sgw_config::Config> {
	let path = write_temp_config(payload);
	let result = sgw_config::load_with_env(&path, |_| None);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn loads_sample_config() {
	let cfg = load_without_env(SAMPLE_CONFIG_TOML).expect("Sample config must load.");

	assert_eq!(cfg.deployment.project_id, "sample-project");
	assert_eq!(cfg.deployment.data_store_id.as_deref(), Some("sample-store"));
	assert_eq!(cfg.security.api_key_header, "X-API-Key");
	assert_eq!(cfg.security.api_keys, vec!["sample-key".to_string()]);
	assert_eq!(cfg.providers.storage.api_base, "https://storage.googleapis.com");
	assert!(cfg.providers.search.api_base.is_none());
	assert!(cfg.output.path_override.is_none(), "Blank path override must normalize to None.");
}

#[test]
fn optional_sections_take_defaults() {
	let payload = sample_with(|root| {
		root.remove("features");
		root.remove("output");
		section(root, "deployment").remove("serving_config");
		section(root, "security").remove("api_key_header");
	});
	let cfg = load_without_env(&payload).expect("Config without optional sections must load.");

	assert!(cfg.features.extractive_answers);
	assert!(cfg.features.extractive_segments);
	assert!(cfg.features.metadata_enrichment);
	assert_eq!(cfg.output.protocol, "gs");
	assert_eq!(cfg.deployment.serving_config, "default_config");
	assert_eq!(cfg.security.api_key_header, "X-API-Key");
}

#[test]
fn rejects_empty_api_key_allow_list() {
	let payload = sample_with(|root| {
		section(root, "security").insert("api_keys".to_string(), Value::Array(Vec::new()));
	});
	let err = load_without_env(&payload).expect_err("Expected validation error.");

	assert!(
		err.to_string().contains("security.api_keys must contain at least one key."),
		"Unexpected error: {err}"
	);
}

#[test]
fn rejects_zero_storage_concurrency() {
	let payload = sample_with(|root| {
		let providers = section(root, "providers");
		let storage = section(providers, "storage");

		storage.insert("max_concurrency".to_string(), Value::Integer(0));
	});
	let err = load_without_env(&payload).expect_err("Expected validation error.");

	assert!(
		err.to_string().contains("providers.storage.max_concurrency must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn rejects_inline_token_together_with_token_file() {
	let payload = sample_with(|root| {
		let providers = section(root, "providers");
		let search = section(providers, "search");

		search.insert(
			"access_token_file".to_string(),
			Value::String("/run/secrets/search-token".to_string()),
		);
	});
	let err = load_without_env(&payload).expect_err("Expected validation error.");

	assert!(
		err.to_string().contains("providers.search must set at most one of access_token"),
		"Unexpected error: {err}"
	);
}

#[test]
fn accepts_token_file_alone() {
	let payload = sample_with(|root| {
		let providers = section(root, "providers");
		let storage = section(providers, "storage");

		storage.remove("access_token");
		storage.insert(
			"access_token_file".to_string(),
			Value::String("/run/secrets/storage-token".to_string()),
		);
	});
	let cfg = load_without_env(&payload).expect("Token file config must load.");

	assert!(cfg.providers.storage.access_token.is_none());
	assert_eq!(
		cfg.providers.storage.access_token_file,
		Some(PathBuf::from("/run/secrets/storage-token"))
	);
}

#[test]
fn env_overlay_applies_deployment_overrides() {
	let vars = HashMap::from([
		("GOOGLE_CLOUD_PROJECT", "env-project"),
		("DATA_STORE_LOCATION", "eu"),
		("DATA_STORE_ID", "env-store"),
		("API_KEY", "env-key"),
		("OUTPUT_PATH_OVERRIDE", "mirror/docs"),
		("OUTPUT_PROTOCOL", "HTTPS"),
		("ENABLE_EXTRACTIVE_SEGMENTS", "false"),
		("PORT", "9090"),
	]);
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let cfg = sgw_config::load_with_env(&path, |name| vars.get(name).map(|v| v.to_string()))
		.expect("Config with env overlay must load.");

	fs::remove_file(&path).expect("Failed to remove test config.");

	assert_eq!(cfg.deployment.project_id, "env-project");
	assert_eq!(cfg.deployment.location, "eu");
	assert_eq!(cfg.deployment.data_store_id.as_deref(), Some("env-store"));
	assert_eq!(cfg.security.api_keys, vec!["sample-key".to_string(), "env-key".to_string()]);
	assert_eq!(cfg.output.path_override.as_deref(), Some("mirror/docs"));
	assert_eq!(cfg.output.protocol, "https");
	assert!(cfg.features.extractive_answers);
	assert!(!cfg.features.extractive_segments);
	assert_eq!(cfg.service.http_bind, "127.0.0.1:9090");
}

#[test]
fn env_overlay_rejects_invalid_port() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let err = sgw_config::load_with_env(&path, |name| {
		(name == "PORT").then(|| "eighty".to_string())
	})
	.expect_err("Expected environment error.");

	fs::remove_file(&path).expect("Failed to remove test config.");

	assert!(matches!(err, Error::Environment { ref name, .. } if name == "PORT"));
}

#[test]
fn reports_missing_file() {
	let path = env::temp_dir().join("sgw_config_test_missing.toml");
	let err = sgw_config::load_with_env(&path, |_| None).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}
