use askama::Template;
use crate::models::{CurrentUser, ScheduleConfig, SelectOption};

#[derive(Template)]
#[template(path = "config.html")]
pub struct ConfigTemplate<'a> {
    pub current_user: Option<CurrentUser>,
    pub environment: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub schedule: &'a ScheduleConfig,
    pub stg_dev_days: Vec<SelectOption>,
    pub prod_days: Vec<SelectOption>,
    pub parameter_name: &'a str,
}

crate::impl_base_template!(ConfigTemplate<'_>);
