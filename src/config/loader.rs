//! Configuration loading.
//!
//! Values are layered in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. The YAML configuration file, when one is given
//! 3. `TEMPLATE_RESOLVER_*` environment variables

use crate::config::schema::ResolverConfig;
use crate::config::validator::validate;
use crate::error::{ResolverError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Positive local TTL in seconds.
pub const ENV_LOCAL_TTL: &str = "TEMPLATE_RESOLVER_LOCAL_TTL";
/// Negative local TTL in seconds.
pub const ENV_NEGATIVE_TTL: &str = "TEMPLATE_RESOLVER_NEGATIVE_TTL";
/// Origin timeout in seconds.
pub const ENV_HTTP_TIMEOUT: &str = "TEMPLATE_RESOLVER_HTTP_TIMEOUT";
/// Origin URL pattern.
pub const ENV_URL_TEMPLATE: &str = "TEMPLATE_RESOLVER_URL_TEMPLATE";
/// Default template body.
pub const ENV_DEFAULT_TEMPLATE: &str = "TEMPLATE_RESOLVER_DEFAULT_TEMPLATE";
/// Shared tier directory.
pub const ENV_SHARED_DIR: &str = "TEMPLATE_RESOLVER_SHARED_DIR";

/// Load a single config file and parse it into [`ResolverConfig`].
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ResolverConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ResolverError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ResolverError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into [`ResolverConfig`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<ResolverConfig> {
    if content.trim().is_empty() {
        return Ok(ResolverConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| ResolverError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Apply `TEMPLATE_RESOLVER_*` overrides from `env`.
///
/// # Errors
///
/// Returns `ConfigValidationError` when a numeric variable does not parse.
pub fn apply_env_overrides(
    mut config: ResolverConfig,
    env: &HashMap<String, String>,
) -> Result<ResolverConfig> {
    if let Some(ttl) = env_seconds(env, ENV_LOCAL_TTL)? {
        config.local_cache.ttl = ttl;
    }
    if let Some(ttl) = env_seconds(env, ENV_NEGATIVE_TTL)? {
        config.local_cache.negative_ttl = ttl;
    }
    if let Some(timeout) = env_seconds(env, ENV_HTTP_TIMEOUT)? {
        config.origin.timeout = timeout;
    }
    if let Some(pattern) = env.get(ENV_URL_TEMPLATE) {
        config.origin.url_template = Some(pattern.clone());
    }
    if let Some(body) = env.get(ENV_DEFAULT_TEMPLATE) {
        config.default_template = body.clone();
    }
    if let Some(dir) = env.get(ENV_SHARED_DIR) {
        config.shared.directory = Some(PathBuf::from(dir));
    }

    Ok(config)
}

fn env_seconds(env: &HashMap<String, String>, name: &str) -> Result<Option<u64>> {
    env.get(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ResolverError::ConfigValidationError {
                    message: format!("{} must be a whole number of seconds, got '{}'", name, raw),
                })
        })
        .transpose()
}

/// Load the effective configuration.
///
/// Reads `path` when given (defaults otherwise), applies the process
/// environment and validates the result.
pub fn load_config(path: Option<&Path>) -> Result<ResolverConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_config_with_env(path, &env)
}

/// Like [`load_config`] with an explicit environment.
pub fn load_config_with_env(
    path: Option<&Path>,
    env: &HashMap<String, String>,
) -> Result<ResolverConfig> {
    let config = match path {
        Some(path) => load_config_file(path)?,
        None => ResolverConfig::default(),
    };

    let config = apply_env_overrides(config, env)?;
    validate(&config)?;
    Ok(config)
}
