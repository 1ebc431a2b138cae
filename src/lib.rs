//! template-resolver - Tiered template resolution with a negative cache.
//!
//! Templates named with a known prefix (`redis:layout`) are looked up in
//! an in-process cache, then a shared cache, then an HTTP origin. A total
//! miss yields a configured default that is cached briefly so a failing
//! origin is not hammered.
//!
//! # Modules
//!
//! - [`cache`] - Local and shared cache tiers
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`origin`] - HTTP origin fetching and body post-processing
//! - [`resolver`] - The resolution pipeline and its hooks
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use template_resolver::cache::MemorySharedTier;
//! use template_resolver::resolver::{ResolutionRequest, Resolver, TierSource};
//!
//! let shared = Arc::new(MemorySharedTier::with_entries([("rlt:layout", "<main/>")]));
//! let resolver = Resolver::builder(shared).build().unwrap();
//!
//! let resolution = resolver.resolve(&ResolutionRequest::new("redis:layout"));
//! let template = resolution.template().unwrap();
//! assert_eq!(template.body, "<main/>");
//! assert_eq!(template.source, TierSource::Shared);
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod origin;
pub mod resolver;

pub use error::{ResolverError, Result};
