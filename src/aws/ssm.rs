use async_trait::async_trait;
use aws_sdk_ssm::{types::ParameterType, Client};
use aws_types::SdkConfig;

use super::region_of;
use crate::error::{Error, Result};
use crate::services::executor::{CommandExecutor, CommandInvocation};
use crate::services::schedule_service::ParameterStore;

const RUN_SHELL_DOCUMENT: &str = "AWS-RunShellScript";
const MAX_COMMENT_LEN: usize = 100;

/// Run Command manager for one region.
#[derive(Debug, Clone)]
pub struct CommandManager {
    pub region: String,
    pub cli: Client,
}

impl CommandManager {
    pub fn new(shared_config: &SdkConfig) -> Self {
        Self {
            region: region_of(shared_config),
            cli: Client::new(shared_config),
        }
    }
}

#[async_trait]
impl CommandExecutor for CommandManager {
    async fn send_command(&self, instance_id: &str, command: &str, comment: &str) -> Result<String> {
        let comment: String = comment.chars().take(MAX_COMMENT_LEN).collect();
        let out = self
            .cli
            .send_command()
            .instance_ids(instance_id)
            .document_name(RUN_SHELL_DOCUMENT)
            .parameters("commands", vec![command.to_string()])
            .comment(comment)
            .send()
            .await
            .map_err(|e| Error::from_sdk("failed send_command", &e))?;

        let command_id = out
            .command()
            .and_then(|c| c.command_id())
            .map(str::to_string)
            .ok_or_else(|| Error::Api {
                message: "send_command returned no command id".into(),
                retryable: false,
            })?;
        tracing::info!(instance_id, %command_id, region = %self.region, "Command execution initiated");
        Ok(command_id)
    }

    async fn command_invocation(&self, command_id: &str, instance_id: &str) -> Result<CommandInvocation> {
        let out = self
            .cli
            .get_command_invocation()
            .command_id(command_id)
            .instance_id(instance_id)
            .send()
            .await
            .map_err(|e| Error::from_sdk("failed get_command_invocation", &e))?;

        Ok(CommandInvocation {
            status: out.status().map(|s| s.as_str().to_string()).unwrap_or_default(),
            output: out.standard_output_content().unwrap_or_default().to_string(),
        })
    }
}

/// Parameter Store access in the dashboard's home region.
#[derive(Debug, Clone)]
pub struct ParameterClient {
    pub region: String,
    pub cli: Client,
}

impl ParameterClient {
    pub fn new(shared_config: &SdkConfig) -> Self {
        Self {
            region: region_of(shared_config),
            cli: Client::new(shared_config),
        }
    }
}

#[async_trait]
impl ParameterStore for ParameterClient {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        let out = self
            .cli
            .get_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| Error::from_sdk("failed get_parameter", &e))?;
        out.parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| Error::Api {
                message: format!("parameter {name} has no value"),
                retryable: false,
            })
    }

    async fn put_parameter(&self, name: &str, value: &str) -> Result<()> {
        self.cli
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::String)
            .overwrite(true)
            .send()
            .await
            .map_err(|e| Error::from_sdk("failed put_parameter", &e))?;
        tracing::info!(name, region = %self.region, "Parameter updated");
        Ok(())
    }
}
