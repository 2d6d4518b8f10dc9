use crate::models::{CommandStatus, InstanceRecord};

/// One line of the instance listing with the last command status, if any.
#[derive(Clone, Debug)]
pub struct InstanceRow {
    pub record: InstanceRecord,
    pub has_status: bool,
    pub status: String,
    pub status_class: &'static str,
}

impl InstanceRow {
    pub fn new(record: InstanceRecord, status: Option<&CommandStatus>) -> Self {
        match status {
            Some(s) => Self {
                record,
                has_status: true,
                status: s.status.clone(),
                status_class: crate::utils::status_class(&s.status),
            },
            None => Self {
                record,
                has_status: false,
                status: String::new(),
                status_class: "",
            },
        }
    }
}

/// One line of the command status page.
#[derive(Clone, Debug)]
pub struct StatusRow {
    pub instance_id: String,
    /// Display name from the inventory; empty when the instance is no longer listed.
    pub name: String,
    pub account_name: String,
    pub region: String,
    pub entry: CommandStatus,
    pub status_class: &'static str,
}
