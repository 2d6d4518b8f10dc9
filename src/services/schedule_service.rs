use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::models::ScheduleConfig;
use crate::services::command_builder::{parse_time, parse_weekday};

/// Key/value parameter storage (SSM Parameter Store in production).
#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get_parameter(&self, name: &str) -> Result<String>;
    async fn put_parameter(&self, name: &str, value: &str) -> Result<()>;
}

/// Cached maintenance schedule backed by one parameter.
#[derive(Clone)]
pub struct ScheduleStore {
    cache: Arc<RwLock<ScheduleConfig>>,
    store: Arc<dyn ParameterStore>,
    parameter_name: String,
}

impl ScheduleStore {
    pub fn new(store: Arc<dyn ParameterStore>, parameter_name: impl Into<String>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(ScheduleConfig::default())),
            store,
            parameter_name: parameter_name.into(),
        }
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    /// Reloads the cache from the parameter store.
    pub async fn load(&self) -> Result<ScheduleConfig> {
        let mut cache = self.cache.write().await;
        let raw = self.store.get_parameter(&self.parameter_name).await?;
        let loaded: ScheduleConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::Schedule(format!("failed to unmarshal schedule config: {e}")))?;
        *cache = loaded.clone();
        tracing::debug!(parameter = %self.parameter_name, ?loaded, "Schedule configuration loaded");
        Ok(loaded)
    }

    pub async fn current(&self) -> ScheduleConfig {
        self.cache.read().await.clone()
    }

    /// Validates and persists `config`; the cache changes only after the
    /// remote write succeeds.
    pub async fn save(&self, config: ScheduleConfig) -> Result<()> {
        validate(&config)?;
        let body = serde_json::to_string_pretty(&config)
            .map_err(|e| Error::Schedule(format!("failed to marshal schedule config: {e}")))?;
        let mut cache = self.cache.write().await;
        self.store.put_parameter(&self.parameter_name, &body).await?;
        *cache = config;
        tracing::info!(parameter = %self.parameter_name, "Schedule configuration saved");
        Ok(())
    }
}

pub fn validate(config: &ScheduleConfig) -> Result<()> {
    parse_weekday(&config.stg_dev_day)?;
    parse_time(&config.stg_dev_time)?;
    parse_weekday(&config.prod_day)?;
    parse_time(&config.prod_time)?;
    Ok(())
}
