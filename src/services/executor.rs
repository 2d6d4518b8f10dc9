use std::sync::Arc;

use async_trait::async_trait;
use aws_types::SdkConfig;

use crate::error::Result;

/// Status and captured stdout of one command invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandInvocation {
    pub status: String,
    pub output: String,
}

/// Remote shell execution against a single region.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Submits `command` for asynchronous execution and returns the remote
    /// command id.
    async fn send_command(&self, instance_id: &str, command: &str, comment: &str) -> Result<String>;

    async fn command_invocation(&self, command_id: &str, instance_id: &str) -> Result<CommandInvocation>;
}

/// Produces executors authorized inside a target account.
#[async_trait]
pub trait RoleSessionFactory: Send + Sync {
    /// Assumes the configured role in `account_id`.
    async fn assume_role(&self, account_id: &str) -> Result<SdkConfig>;

    /// Builds an executor for `region` from an assumed-role session.
    fn executor(&self, session: &SdkConfig, region: &str) -> Result<Arc<dyn CommandExecutor>>;
}
