use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

// Default configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
pub const DEFAULT_ENVIRONMENT: &str = "test";
pub const DEFAULT_HOME_REGION: &str = "eu-west-2";
pub const DEFAULT_ROLE_NAME: &str = "ec2-restart-manager-restarter";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_INVENTORY_REFRESH_SECS: u64 = 300;
pub const CLIENT_SECRET_ENV: &str = "AZURE_AD_CLIENT_SECRET";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureAdConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub redirect_url: String,
    pub group_id: String,
    /// Secrets Manager secret holding the client secret, used when
    /// `AZURE_AD_CLIENT_SECRET` is not set.
    #[serde(default)]
    pub secret_name: Option<String>,
    /// JSON key inside `secret_name`.
    #[serde(default)]
    pub secret_key: Option<String>,
}

/// Settings for one deployment environment (one entry under `env:`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    pub s3: S3Config,
    pub azure_ad: AzureAdConfig,
    #[serde(default = "default_region")]
    pub region: String,
    /// Role assumed in every target account.
    #[serde(default = "default_role_name")]
    pub role_name: String,
    #[serde(default)]
    pub schedule_parameter: Option<String>,
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default)]
    pub inventory_refresh_secs: Option<u64>,
    /// Name of the selected environment; not read from YAML.
    #[serde(skip)]
    pub environment: String,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    env: HashMap<String, EnvConfig>,
}

fn default_region() -> String {
    DEFAULT_HOME_REGION.to_string()
}

fn default_role_name() -> String {
    DEFAULT_ROLE_NAME.to_string()
}

impl EnvConfig {
    /// Parameter Store name holding the schedule JSON.
    pub fn schedule_parameter_name(&self) -> String {
        self.schedule_parameter
            .clone()
            .unwrap_or_else(|| format!("/ec2-restart-manager/{}/schedule", self.environment))
    }

    pub fn public_base_url(&self) -> String {
        sanitize_base_url(self.public_base_url.as_deref().unwrap_or(DEFAULT_PUBLIC_BASE_URL))
    }

    pub fn inventory_refresh_interval(&self) -> Duration {
        Duration::from_secs(
            self.inventory_refresh_secs
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_INVENTORY_REFRESH_SECS),
        )
    }
}

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

/// Active environment name from `ENVIRONMENT`, defaulting to `test`.
pub fn current_environment() -> String {
    env::var("ENVIRONMENT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

pub fn debug_enabled() -> bool {
    crate::utils::parse_flag(env::var("DEBUG").ok().as_ref(), false)
}

pub fn client_secret_from_env() -> Option<String> {
    env::var(CLIENT_SECRET_ENV).ok().filter(|s| !s.trim().is_empty())
}

/// Parses the YAML document and selects the section for `environment`.
pub fn parse_config(text: &str, environment: &str) -> Result<EnvConfig> {
    let file: ConfigFile = serde_yaml::from_str(text)
        .map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;
    let mut cfg = file.env.get(environment).cloned().ok_or_else(|| {
        Error::Config(format!("environment {environment:?} configuration not found"))
    })?;
    cfg.environment = environment.to_string();
    Ok(cfg)
}

pub fn load_config(path: &Path, environment: &str) -> Result<EnvConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    let cfg = parse_config(&text, environment)?;
    tracing::info!(path = %path.display(), environment, region = %cfg.region, "Loaded configuration");
    Ok(cfg)
}

pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_PUBLIC_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
