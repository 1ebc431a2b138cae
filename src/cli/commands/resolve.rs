//! Resolve command implementation.
//!
//! The `template-resolver resolve` command runs one name through the tiers
//! and prints the resulting body.

use std::io::Write;

use crate::cli::args::ResolveArgs;
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::resolver::{Resolution, ResolutionRequest, Resolver};

use super::dispatcher::{Command, CommandResult, EXIT_NOT_APPLICABLE};

/// The resolve command implementation.
pub struct ResolveCommand<'a> {
    config: &'a ResolverConfig,
    args: ResolveArgs,
}

impl<'a> ResolveCommand<'a> {
    /// Create a new resolve command.
    pub fn new(config: &'a ResolverConfig, args: ResolveArgs) -> Self {
        Self { config, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ResolveArgs {
        &self.args
    }

    fn request(&self) -> ResolutionRequest {
        let mut request = ResolutionRequest::new(self.args.name.as_str());
        if let Some(prefix) = &self.args.prefix {
            request = request.with_prefix(prefix.as_str());
        }
        for (key, value) in &self.args.context {
            request = request.with_context(key.as_str(), value.as_str());
        }
        request
    }
}

impl Command for ResolveCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let resolver = Resolver::from_config(self.config)?;

        match resolver.resolve(&self.request()) {
            Resolution::Resolved(template) => {
                if self.args.show_source {
                    eprintln!("# {} from {}", template.virtual_path, template.source);
                }
                out.write_all(template.body.as_bytes())?;
                out.flush()?;
                Ok(CommandResult::success())
            }
            Resolution::NotApplicable => {
                eprintln!("'{}' is not handled by this resolver", self.args.name);
                Ok(CommandResult::failure(EXIT_NOT_APPLICABLE))
            }
        }
    }
}
