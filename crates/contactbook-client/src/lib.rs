//! CLI, configuration, secret references and contact actions
//!
//! This crate provides the `contactbook` command-line interface.

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use actions::{ContactActions, Flash, FlashLevel};
pub use cli::Cli;
pub use error::{ClientError, ClientResult};
