use askama::Template;
use crate::models::{CurrentUser, FilterSelect, InstanceRow};

#[derive(Template)]
#[template(path = "instances.html")]
pub struct InstancesPageTemplate<'a> {
    pub current_user: Option<CurrentUser>,
    pub environment: String,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub rows: &'a [InstanceRow],
    pub filters: &'a [FilterSelect],
    pub filtered: bool,
    pub total: usize,
}

crate::impl_base_template!(InstancesPageTemplate<'_>);
