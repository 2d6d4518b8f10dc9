use askama::Template;
use crate::models::CurrentUser;

#[derive(Template)]
#[template(path = "access_denied.html")]
pub struct AccessDeniedTemplate {
    pub current_user: Option<CurrentUser>,
    pub environment: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub logout_url: String,
}

crate::impl_base_template!(AccessDeniedTemplate);
