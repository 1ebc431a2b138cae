//! Command-line interface for the template resolver.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConfigArgs, ResolveArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
