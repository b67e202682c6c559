//! Command handlers.
//!
//! Each handler translates parsed arguments into calls on the core services
//! and prints the result. No business logic lives here.

pub mod completions;
pub mod config;
pub mod envs;
pub mod fetch;
pub mod generate;
pub mod hook;
pub mod init;
pub mod list;
pub mod task;
