//! Dashboard for sending patch, upgrade, restart and custom commands to EC2
//! instances across accounts through SSM Run Command.

pub mod aws;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod routes;
pub mod services;
pub mod templates;
pub mod utils;

pub use error::{Error, Result};
pub use routes::build_router;
