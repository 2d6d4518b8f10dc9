use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::EnvConfig;
use crate::identity::AzureAdClient;
use crate::models::UserSession;
use crate::services::{Dispatcher, InstanceDirectory, ScheduleStore, SnapshotSource, StatusStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<EnvConfig>,
    pub sessions: Arc<Mutex<HashMap<String, UserSession>>>,
    pub flash_store: Arc<Mutex<HashMap<String, Vec<String>>>>,
    pub directory: InstanceDirectory,
    pub statuses: StatusStore,
    pub schedule: ScheduleStore,
    pub dispatcher: Dispatcher,
    pub inventory: Arc<dyn SnapshotSource>,
    pub identity: AzureAdClient,
    pub public_base_url: String,
    pub custom_css: Option<String>,
}

impl AppState {
    /// Display name for a live session. Expired sessions are dropped here
    /// along with any flash messages still queued for them.
    pub fn display_name_for(&self, session_id: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let session = sessions.get(session_id)?;
        if !session.is_expired(chrono::Utc::now()) {
            return Some(session.display_name.clone());
        }
        sessions.remove(session_id);
        drop(sessions);
        self.flash_store
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(session_id);
        tracing::debug!("Session expired");
        None
    }

    /// Drops every expired session. Called by the sign-in handler so
    /// abandoned sessions do not accumulate.
    pub fn prune_sessions(&self) {
        let now = chrono::Utc::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(now))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            sessions.remove(id);
        }
        drop(sessions);
        let mut flashes = self.flash_store.lock().unwrap_or_else(|e| e.into_inner());
        for id in &expired {
            flashes.remove(id);
        }
    }

    pub fn push_flash(&self, session_id: &str, message: impl Into<String>) {
        self.flash_store
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(session_id.to_string())
            .or_default()
            .push(message.into());
    }
}
