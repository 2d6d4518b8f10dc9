//! In-memory stand-ins for the AWS-backed seams.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_types::SdkConfig;

use ec2rm::models::InstanceRecord;
use ec2rm::services::{
    CommandExecutor, CommandInvocation, InstanceDirectory, ParameterStore, RoleSessionFactory, ScheduleStore,
    SnapshotSource,
};
use ec2rm::{Error, Result};

pub const SCHEDULE_PARAM: &str = "/ec2-restart-manager/test/schedule";
pub const SCHEDULE_JSON: &str =
    r#"{"stg_dev_day":"Wednesday","stg_dev_time":"10:00","prod_day":"Friday","prod_time":"22:00"}"#;

/// Scripted Run Command endpoint. Each poll takes the next scripted answer;
/// once the script is empty every poll reports `InProgress`.
#[derive(Default)]
pub struct FakeExecutor {
    pub script: Mutex<VecDeque<Result<CommandInvocation>>>,
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub polls: AtomicUsize,
    pub fail_submit: bool,
}

impl FakeExecutor {
    pub fn scripted(answers: Vec<Result<CommandInvocation>>) -> Self {
        Self {
            script: Mutex::new(answers.into()),
            ..Default::default()
        }
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn sent_commands(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

pub fn invocation(status: &str, output: &str) -> Result<CommandInvocation> {
    Ok(CommandInvocation {
        status: status.to_string(),
        output: output.to_string(),
    })
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn send_command(&self, instance_id: &str, command: &str, comment: &str) -> Result<String> {
        if self.fail_submit {
            return Err(Error::Api { message: "InvalidInstanceId".into(), retryable: false });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((instance_id.to_string(), command.to_string(), comment.to_string()));
        Ok(format!("cmd-{}-{}", instance_id, sent.len()))
    }

    async fn command_invocation(&self, _command_id: &str, _instance_id: &str) -> Result<CommandInvocation> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| invocation("InProgress", "still running"))
    }
}

/// Role assumption that fails for a configurable set of accounts.
pub struct FakeSessions {
    pub executor: Arc<FakeExecutor>,
    pub failing_accounts: Mutex<HashSet<String>>,
    pub assumed: Mutex<Vec<String>>,
}

impl FakeSessions {
    pub fn new(executor: Arc<FakeExecutor>) -> Self {
        Self {
            executor,
            failing_accounts: Mutex::new(HashSet::new()),
            assumed: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_account(&self, account_id: &str) {
        self.failing_accounts.lock().unwrap().insert(account_id.to_string());
    }
}

#[async_trait]
impl RoleSessionFactory for FakeSessions {
    async fn assume_role(&self, account_id: &str) -> Result<SdkConfig> {
        self.assumed.lock().unwrap().push(account_id.to_string());
        if self.failing_accounts.lock().unwrap().contains(account_id) {
            return Err(Error::Api { message: "AccessDenied".into(), retryable: false });
        }
        Ok(SdkConfig::builder().build())
    }

    fn executor(&self, _session: &SdkConfig, region: &str) -> Result<Arc<dyn CommandExecutor>> {
        if region.is_empty() {
            return Err(Error::Config("instance has no region".into()));
        }
        Ok(self.executor.clone())
    }
}

#[derive(Default)]
pub struct MemoryParams {
    pub values: Mutex<HashMap<String, String>>,
}

impl MemoryParams {
    pub fn with_schedule() -> Self {
        let params = Self::default();
        params
            .values
            .lock()
            .unwrap()
            .insert(SCHEDULE_PARAM.to_string(), SCHEDULE_JSON.to_string());
        params
    }
}

#[async_trait]
impl ParameterStore for MemoryParams {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        self.values
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Api { message: format!("ParameterNotFound {name}"), retryable: false })
    }

    async fn put_parameter(&self, name: &str, value: &str) -> Result<()> {
        self.values.lock().unwrap().insert(name.to_string(), value.to_string());
        Ok(())
    }
}

pub struct StaticSource(pub String);

#[async_trait]
impl SnapshotSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        Ok(self.0.as_bytes().to_vec())
    }

    fn describe(&self) -> String {
        "memory://inventory.csv".into()
    }
}

pub fn schedule_store() -> ScheduleStore {
    ScheduleStore::new(Arc::new(MemoryParams::with_schedule()), SCHEDULE_PARAM)
}

pub fn record(id: &str, account_id: &str, region: &str, env: &str) -> InstanceRecord {
    InstanceRecord {
        id: id.to_string(),
        account_id: account_id.to_string(),
        account_name: format!("acct-{account_id}"),
        state: "running".to_string(),
        name: format!("name-{id}"),
        service: "web".to_string(),
        owner: "team-ops".to_string(),
        region: region.to_string(),
        environment_class: env.to_string(),
    }
}

pub fn directory(records: Vec<InstanceRecord>) -> InstanceDirectory {
    let directory = InstanceDirectory::new();
    directory.replace(records);
    directory
}
