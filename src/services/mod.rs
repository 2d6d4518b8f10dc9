pub mod command_builder;
pub mod directory;
pub mod dispatcher;
pub mod executor;
pub mod inventory;
pub mod poller;
pub mod schedule_service;
pub mod session_service;
pub mod status_store;

// Re-export commonly used types
pub use command_builder::{build_command, BuiltCommand, CommandType};
pub use directory::{FilterOptions, InstanceDirectory, InstanceFilter};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use executor::{CommandExecutor, CommandInvocation, RoleSessionFactory};
pub use inventory::{parse_inventory, refresh, spawn_refresher, SnapshotSource};
pub use poller::{poll_until_terminal, PollJob, PollSettings};
pub use schedule_service::{ParameterStore, ScheduleStore};
pub use session_service::random_session_id;
pub use status_store::StatusStore;
