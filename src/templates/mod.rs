// Base template trait shared by every page
pub mod base_template;
pub use base_template::BaseTemplate;

pub mod about_template;
pub mod access_denied_template;
pub mod command_status_template;
pub mod config_template;
pub mod instances_page_template;

pub use about_template::AboutTemplate;
pub use access_denied_template::AccessDeniedTemplate;
pub use command_status_template::CommandStatusTemplate;
pub use config_template::ConfigTemplate;
pub use instances_page_template::InstancesPageTemplate;
