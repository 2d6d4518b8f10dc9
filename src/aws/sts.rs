use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use aws_credential_types::{provider::SharedCredentialsProvider, Credentials};
use aws_sdk_sts::Client;
use aws_types::SdkConfig;

use super::{ssm::CommandManager, with_region};
use crate::error::{Error, Result};
use crate::services::executor::{CommandExecutor, RoleSessionFactory};

/// Assumes one named role across many accounts.
#[derive(Debug, Clone)]
pub struct RoleSessions {
    base: SdkConfig,
    role_name: String,
    cli: Client,
}

impl RoleSessions {
    pub fn new(base: &SdkConfig, role_name: &str) -> Self {
        Self {
            base: base.clone(),
            role_name: role_name.to_string(),
            cli: Client::new(base),
        }
    }

    pub fn role_arn(&self, account_id: &str) -> String {
        role_arn(account_id, &self.role_name)
    }
}

pub fn role_arn(account_id: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{}:role/{}", account_id.trim(), role_name)
}

#[async_trait]
impl RoleSessionFactory for RoleSessions {
    async fn assume_role(&self, account_id: &str) -> Result<SdkConfig> {
        let arn = self.role_arn(account_id);
        tracing::debug!(%arn, "Assuming role");
        let out = self
            .cli
            .assume_role()
            .role_arn(&arn)
            .role_session_name(format!("ec2-restart-manager-{}", chrono::Utc::now().timestamp()))
            .send()
            .await
            .map_err(|e| Error::from_sdk("failed assume_role", &e))?;

        let creds = out.credentials().ok_or_else(|| Error::Api {
            message: format!("assume_role for {arn} returned no credentials"),
            retryable: false,
        })?;
        let expiry = SystemTime::try_from(*creds.expiration()).ok();
        let credentials = Credentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            Some(creds.session_token().to_string()),
            expiry,
            "AssumeRole",
        );

        Ok(self
            .base
            .to_builder()
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .build())
    }

    fn executor(&self, session: &SdkConfig, region: &str) -> Result<Arc<dyn CommandExecutor>> {
        if region.trim().is_empty() {
            return Err(Error::Config("instance has no region".into()));
        }
        Ok(Arc::new(CommandManager::new(&with_region(session, region.trim()))))
    }
}
