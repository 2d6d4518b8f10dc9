pub mod app_state;
pub mod command_status;
pub mod current_user;
pub mod instance_record;
pub mod instance_row;
pub mod schedule_config;
pub mod select_option;
pub mod user_session;

pub use app_state::AppState;
pub use command_status::CommandStatus;
pub use current_user::CurrentUser;
pub use instance_record::InstanceRecord;
pub use instance_row::{InstanceRow, StatusRow};
pub use schedule_config::{ScheduleConfig, WEEKDAYS};
pub use select_option::{FilterSelect, SelectOption};
pub use user_session::UserSession;
