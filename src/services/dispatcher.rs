use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::models::command_status::{
    STATUS_ASSUME_ROLE_FAILED, STATUS_CLIENT_FAILED, STATUS_INSTANCE_NOT_FOUND, STATUS_INVALID_COMMAND,
    STATUS_IN_PROGRESS, STATUS_SUBMIT_FAILED, STATUS_TIMEZONE_FAILED,
};
use crate::services::command_builder::{build_command, BuiltCommand, CommandType};
use crate::services::directory::InstanceDirectory;
use crate::services::executor::RoleSessionFactory;
use crate::services::poller::{poll_until_terminal, PollJob, PollSettings};
use crate::services::schedule_service::ScheduleStore;
use crate::services::status_store::StatusStore;

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub submitted: usize,
    pub failed: usize,
    /// One detached poller per submitted command. Dropping these does not
    /// cancel the pollers.
    pub pollers: Vec<JoinHandle<()>>,
}

/// Sends one operation to a batch of instances and starts a poller for each
/// accepted command.
#[derive(Clone)]
pub struct Dispatcher {
    directory: InstanceDirectory,
    statuses: StatusStore,
    schedule: ScheduleStore,
    sessions: Arc<dyn RoleSessionFactory>,
    poll: PollSettings,
}

impl Dispatcher {
    pub fn new(
        directory: InstanceDirectory,
        statuses: StatusStore,
        schedule: ScheduleStore,
        sessions: Arc<dyn RoleSessionFactory>,
    ) -> Self {
        Self {
            directory,
            statuses,
            schedule,
            sessions,
            poll: PollSettings::default(),
        }
    }

    pub fn statuses(&self) -> &StatusStore {
        &self.statuses
    }

    /// Processes `instance_ids` in order. A failure for one instance is
    /// recorded as its status and never stops the batch.
    pub async fn dispatch(&self, instance_ids: &[String], kind: &str, custom_command: &str) -> DispatchReport {
        if let Err(e) = self.schedule.load().await {
            tracing::warn!(%e, parameter = %self.schedule.parameter_name(), "Could not refresh schedule; using cached values");
        }
        let schedule = self.schedule.current().await;
        let command_type = CommandType::parse(kind, custom_command);

        let mut report = DispatchReport::default();
        for instance_id in instance_ids {
            match self.dispatch_one(instance_id, command_type.as_ref(), &schedule).await {
                Some(handle) => {
                    report.submitted += 1;
                    report.pollers.push(handle);
                }
                None => report.failed += 1,
            }
        }
        tracing::info!(kind, submitted = report.submitted, failed = report.failed, "Command batch dispatched");
        report
    }

    async fn dispatch_one(
        &self,
        instance_id: &str,
        command_type: Option<&CommandType>,
        schedule: &crate::models::ScheduleConfig,
    ) -> Option<JoinHandle<()>> {
        let Some(instance) = self.directory.get(instance_id) else {
            tracing::error!(instance_id, "Instance not found in inventory");
            self.fail(instance_id, STATUS_INSTANCE_NOT_FOUND);
            return None;
        };

        let Some(command_type) = command_type else {
            tracing::error!(instance_id, "Invalid command type");
            self.fail(instance_id, STATUS_INVALID_COMMAND);
            return None;
        };

        let built = match build_command(command_type, &instance, schedule, chrono::Utc::now()) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(%e, instance_id, region = %instance.region, "Failed to convert schedule to UTC");
                self.fail(instance_id, STATUS_TIMEZONE_FAILED);
                return None;
            }
        };

        let session = match self.sessions.assume_role(&instance.account_id).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(%e, instance_id, account_id = %instance.account_id, "Failed to assume role");
                self.fail_built(instance_id, STATUS_ASSUME_ROLE_FAILED, &built);
                return None;
            }
        };

        let executor = match self.sessions.executor(&session, &instance.region) {
            Ok(x) => x,
            Err(e) => {
                tracing::error!(%e, instance_id, region = %instance.region, "Failed to create SSM client");
                self.fail_built(instance_id, STATUS_CLIENT_FAILED, &built);
                return None;
            }
        };

        let command_id = match executor.send_command(instance_id, &built.command, &built.label).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(%e, retryable = e.retryable(), instance_id, "Failed to execute command");
                self.fail_built(instance_id, STATUS_SUBMIT_FAILED, &built);
                return None;
            }
        };

        tracing::info!(instance_id, %command_id, label = %built.label, "Command submitted");
        self.statuses
            .record(instance_id, STATUS_IN_PROGRESS, "", &command_id, &built.command, &built.label);

        let job = PollJob {
            instance_id: instance_id.to_string(),
            command_id,
            command: built.command,
            label: built.label,
        };
        Some(tokio::spawn(poll_until_terminal(executor, self.statuses.clone(), job, self.poll)))
    }

    fn fail(&self, instance_id: &str, status: &str) {
        self.statuses.record(instance_id, status, "", "", "", "");
    }

    /// Failure after the command was built: keep what was attempted.
    fn fail_built(&self, instance_id: &str, status: &str, built: &BuiltCommand) {
        self.statuses.record(instance_id, status, "", "", &built.command, &built.label);
    }
}
