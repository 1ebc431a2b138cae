//! Configuration loading, parsing, and validation.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File loading and environment overrides in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use template_resolver::config::{parse_config, validate};
//! use std::path::Path;
//!
//! let config = parse_config("local_cache:\n  ttl: 120\n", Path::new("resolver.yml")).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.local_cache.ttl, 120);
//! assert_eq!(config.local_cache.negative_ttl, 10);
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

// Schema re-exports
pub use schema::{GuardConfig, LocalCacheConfig, OriginConfig, ResolverConfig, SharedConfig};

// Loader re-exports
pub use loader::{
    apply_env_overrides, load_config, load_config_file, load_config_with_env, parse_config,
    ENV_DEFAULT_TEMPLATE, ENV_HTTP_TIMEOUT, ENV_LOCAL_TTL, ENV_NEGATIVE_TTL, ENV_SHARED_DIR,
    ENV_URL_TEMPLATE,
};

// Validator re-exports
pub use validator::{validate, validate_config, ValidationError};
