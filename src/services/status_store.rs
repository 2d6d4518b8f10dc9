use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::CommandStatus;

/// Last known command status per instance, shared by handlers and pollers.
///
/// The lock is only held for a single insert or copy, never across a remote
/// call.
#[derive(Clone, Default)]
pub struct StatusStore {
    inner: Arc<Mutex<HashMap<String, CommandStatus>>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the instance's record, stamping it with the current time.
    pub fn record(&self, instance_id: &str, status: &str, output: &str, command_id: &str, command: &str, label: &str) {
        let entry = CommandStatus {
            status: status.to_string(),
            output: output.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            command_id: command_id.to_string(),
            command: command.to_string(),
            label: label.to_string(),
        };
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(instance_id.to_string(), entry);
    }

    /// Like [`record`](Self::record), but only while the stored entry still
    /// belongs to `command_id`. Returns false when a newer dispatch has
    /// replaced it.
    pub fn record_if_current(
        &self,
        instance_id: &str,
        status: &str,
        output: &str,
        command_id: &str,
        command: &str,
        label: &str,
    ) -> bool {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match map.get(instance_id) {
            Some(existing) if existing.command_id == command_id => {}
            _ => return false,
        }
        map.insert(
            instance_id.to_string(),
            CommandStatus {
                status: status.to_string(),
                output: output.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                command_id: command_id.to_string(),
                command: command.to_string(),
                label: label.to_string(),
            },
        );
        true
    }

    pub fn get(&self, instance_id: &str) -> Option<CommandStatus> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(instance_id)
            .cloned()
    }

    /// Copy of every record.
    pub fn snapshot(&self) -> HashMap<String, CommandStatus> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
