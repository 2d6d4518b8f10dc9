use askama::Template;
use crate::models::{CurrentUser, StatusRow};

#[derive(Template)]
#[template(path = "command_status.html")]
pub struct CommandStatusTemplate<'a> {
    pub current_user: Option<CurrentUser>,
    pub environment: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub rows: &'a [StatusRow],
    /// Enables the page's auto-refresh while any poller is still running.
    pub any_active: bool,
}

crate::impl_base_template!(CommandStatusTemplate<'_>);
