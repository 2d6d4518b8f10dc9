pub mod auth;
pub mod commands;
pub mod helpers;
pub mod instances;
pub mod middleware;
pub mod schedule;
pub mod system;
