use serde::Serialize;

pub const STATUS_IN_PROGRESS: &str = "InProgress";
pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_SUCCESS: &str = "Success";
pub const STATUS_TIMEOUT: &str = "Timeout";
pub const STATUS_INSTANCE_NOT_FOUND: &str = "Failed to fetch instance details";
pub const STATUS_INVALID_COMMAND: &str = "Invalid command type";
pub const STATUS_TIMEZONE_FAILED: &str = "Failed to convert timezone";
pub const STATUS_ASSUME_ROLE_FAILED: &str = "Failed to assume role in account";
pub const STATUS_CLIENT_FAILED: &str = "Failed to create SSM client";
pub const STATUS_SUBMIT_FAILED: &str = "Failed to execute command";
pub const STATUS_POLL_FAILED: &str = "Error checking status";

/// Last known state of the command most recently sent to an instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommandStatus {
    /// Remote status (`InProgress`, `Success`, ...) or a local failure description.
    pub status: String,
    pub output: String,
    /// RFC 3339 time of the last update.
    pub timestamp: String,
    pub command_id: String,
    pub command: String,
    pub label: String,
}

impl CommandStatus {
    /// True while the remote side still reports the command as running.
    pub fn is_active(&self) -> bool {
        is_non_terminal(&self.status)
    }
}

/// The only two remote statuses that keep a poller going.
pub fn is_non_terminal(status: &str) -> bool {
    status == STATUS_IN_PROGRESS || status == STATUS_PENDING
}
