use chrono::{DateTime, Duration, Utc};

/// A signed-in operator. Lives as long as the access token it came from.
#[derive(Clone, Debug)]
pub struct UserSession {
    pub display_name: String,
    pub expires_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(display_name: impl Into<String>, lifetime_secs: i64) -> Self {
        Self {
            display_name: display_name.into(),
            expires_at: Utc::now() + Duration::seconds(lifetime_secs),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
