//! AWS SDK plumbing: shared configuration loading plus thin managers for the
//! services the dashboard talks to.

pub mod s3;
pub mod secrets;
pub mod ssm;
pub mod sts;

use aws_config::{meta::region::RegionProviderChain, BehaviorVersion};
use aws_types::{region::Region, SdkConfig};

use crate::config::DEFAULT_HOME_REGION;

/// Loads the ambient AWS configuration (environment, profile or instance
/// role) for `region`.
pub async fn load_config(region: Option<String>) -> SdkConfig {
    tracing::info!(?region, "Loading AWS configuration");
    let regp = RegionProviderChain::first_try(region.map(Region::new))
        .or_default_provider()
        .or_else(Region::new(DEFAULT_HOME_REGION));
    aws_config::defaults(BehaviorVersion::latest())
        .region(regp)
        .load()
        .await
}

/// Copy of `config` pointed at another region.
pub fn with_region(config: &SdkConfig, region: &str) -> SdkConfig {
    config
        .to_builder()
        .region(Region::new(region.to_string()))
        .build()
}

pub(crate) fn region_of(config: &SdkConfig) -> String {
    config.region().map(|r| r.to_string()).unwrap_or_default()
}
