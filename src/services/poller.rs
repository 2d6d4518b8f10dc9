use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::models::command_status::{is_non_terminal, STATUS_POLL_FAILED, STATUS_TIMEOUT};
use crate::services::executor::CommandExecutor;
use crate::services::status_store::StatusStore;

pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_POLLS: u32 = 60;

/// Polling cadence; the defaults give roughly ten minutes per command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Wait before the first poll so the remote side can register the command.
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

/// One submitted command to follow.
#[derive(Clone, Debug)]
pub struct PollJob {
    pub instance_id: String,
    pub command_id: String,
    pub command: String,
    pub label: String,
}

impl PollJob {
    /// Stores an observation unless a later dispatch owns the entry now.
    fn write(&self, statuses: &StatusStore, status: &str, output: &str) -> bool {
        let written =
            statuses.record_if_current(&self.instance_id, status, output, &self.command_id, &self.command, &self.label);
        if !written {
            tracing::info!(instance_id = %self.instance_id, command_id = %self.command_id, "Entry replaced by a newer command; polling stopped");
        }
        written
    }
}

/// Polls until the command leaves `InProgress`/`Pending`, a poll fails, or the
/// poll budget runs out. Every observation replaces the instance's record
/// while it still belongs to this command.
pub async fn poll_until_terminal(
    executor: Arc<dyn CommandExecutor>,
    statuses: StatusStore,
    job: PollJob,
    settings: PollSettings,
) {
    sleep(settings.initial_delay).await;

    let mut last_output = String::new();
    for attempt in 1..=settings.max_polls {
        let invocation = match executor.command_invocation(&job.command_id, &job.instance_id).await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(%e, retryable = e.retryable(), instance_id = %job.instance_id, command_id = %job.command_id, "Error checking command status");
                job.write(&statuses, STATUS_POLL_FAILED, "");
                return;
            }
        };

        if !job.write(&statuses, &invocation.status, &invocation.output) {
            return;
        }

        if !is_non_terminal(&invocation.status) {
            tracing::info!(instance_id = %job.instance_id, command_id = %job.command_id, status = %invocation.status, attempt, "Command finished");
            return;
        }
        last_output = invocation.output;

        if attempt < settings.max_polls {
            sleep(settings.interval).await;
        }
    }

    tracing::warn!(instance_id = %job.instance_id, command_id = %job.command_id, polls = settings.max_polls, "Command did not finish in time");
    job.write(&statuses, STATUS_TIMEOUT, &last_output);
}
