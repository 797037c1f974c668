//! su-cli library
//!
//! Exports the command definitions and the HTTP client for use in tests.

pub mod cli;
pub mod client;
pub mod commands;
pub mod update_commands;
pub mod update_self;


pub use cli::Cli;
pub use client::{CliClientResult, Client, ClientError, ServerResponse};
pub use commands::Commands;
pub use update_commands::UpdateCommands;
pub use update_self::{UpdateSelfRequest, run_update_self, run_version};
