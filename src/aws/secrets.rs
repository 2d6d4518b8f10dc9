use std::collections::HashMap;

use aws_sdk_secretsmanager::Client;
use aws_types::SdkConfig;

use crate::error::{Error, Result};

/// Reads one key out of a JSON secret.
pub async fn fetch_secret_key(shared_config: &SdkConfig, secret_name: &str, key: &str) -> Result<String> {
    tracing::info!(secret_name, key, "Fetching secret");
    let out = Client::new(shared_config)
        .get_secret_value()
        .secret_id(secret_name)
        .send()
        .await
        .map_err(|e| Error::from_sdk("failed get_secret_value", &e))?;
    let raw = out
        .secret_string()
        .ok_or_else(|| Error::Config(format!("secret string is empty for secret {secret_name}")))?;
    extract_secret_key(raw, key)
}

pub fn extract_secret_key(secret_json: &str, key: &str) -> Result<String> {
    let data: HashMap<String, String> = serde_json::from_str(secret_json)
        .map_err(|e| Error::Config(format!("failed to parse secret JSON: {e}")))?;
    data.get(key)
        .cloned()
        .ok_or_else(|| Error::Config(format!("key {key} not found in secret")))
}
