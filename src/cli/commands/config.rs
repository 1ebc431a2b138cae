//! Config command implementation.
//!
//! The `template-resolver config` command shows the effective configuration.

use std::io::Write;

use crate::cli::args::ConfigArgs;
use crate::config::ResolverConfig;
use crate::error::{ResolverError, Result};

use super::dispatcher::{Command, CommandResult};

/// The config command implementation.
pub struct ConfigCommand<'a> {
    config: &'a ResolverConfig,
    args: ConfigArgs,
}

impl<'a> ConfigCommand<'a> {
    /// Create a new config command.
    pub fn new(config: &'a ResolverConfig, args: ConfigArgs) -> Self {
        Self { config, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let rendered = if self.args.json {
            serde_json::to_string_pretty(self.config).map_err(|e| ResolverError::Other(e.into()))?
        } else {
            serde_yaml::to_string(self.config).map_err(|e| ResolverError::Other(e.into()))?
        };

        writeln!(out, "{}", rendered.trim_end())?;
        Ok(CommandResult::success())
    }
}
