//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, ResolverConfig};
use crate::error::Result;

/// Exit code for a name the resolver does not handle.
pub const EXIT_NOT_APPLICABLE: i32 = 3;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, writing its primary output to `out`.
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Process exit status; codes outside `0..=255` become 1.
    pub fn exit_status(&self) -> u8 {
        u8::try_from(self.exit_code).unwrap_or(1)
    }
}

/// Dispatches CLI commands to their implementations.
#[derive(Debug)]
pub struct CommandDispatcher {
    config: ResolverConfig,
}

impl CommandDispatcher {
    /// Create a dispatcher around an already loaded configuration.
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Load configuration for `cli` (file plus environment) and wrap it.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref())?;
        Ok(Self::new(config))
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, out: &mut dyn Write) -> Result<CommandResult> {
        match &cli.command {
            Commands::Resolve(args) => {
                let cmd = super::resolve::ResolveCommand::new(&self.config, args.clone());
                cmd.execute(out)
            }
            Commands::Config(args) => {
                let cmd = super::config::ConfigCommand::new(&self.config, args.clone());
                cmd.execute(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(EXIT_NOT_APPLICABLE);
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn exit_status_does_not_wrap() {
        assert_eq!(CommandResult::success().exit_status(), 0);
        assert_eq!(CommandResult::failure(EXIT_NOT_APPLICABLE).exit_status(), 3);
        assert_eq!(CommandResult::failure(256).exit_status(), 1);
        assert_eq!(CommandResult::failure(-1).exit_status(), 1);
    }

    #[test]
    fn dispatches_config_command() {
        let cli = Cli::parse_from(["template-resolver", "config"]);
        let dispatcher = CommandDispatcher::new(ResolverConfig::default());
        let mut out = Vec::new();

        let result = dispatcher.dispatch(&cli, &mut out).unwrap();

        assert!(result.success);
        assert!(String::from_utf8(out).unwrap().contains("name_prefix"));
    }

    #[test]
    fn dispatches_resolve_command() {
        let cli = Cli::parse_from(["template-resolver", "resolve", "plain/layout"]);
        let dispatcher = CommandDispatcher::new(ResolverConfig::default());
        let mut out = Vec::new();

        let result = dispatcher.dispatch(&cli, &mut out).unwrap();

        assert_eq!(result.exit_code, EXIT_NOT_APPLICABLE);
    }
}
