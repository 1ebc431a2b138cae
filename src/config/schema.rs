//! Configuration schema definitions.
//!
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::DEFAULT_SHARED_KEY_PREFIX;
use crate::resolver::{DEFAULT_HANDLER, DEFAULT_NAME_PREFIX};

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Prefix a template name must carry to be resolved
    pub name_prefix: String,

    /// Local tier settings
    pub local_cache: LocalCacheConfig,

    /// Shared tier settings
    pub shared: SharedConfig,

    /// Origin settings
    pub origin: OriginConfig,

    /// Body served when every tier misses
    pub default_template: String,

    /// Handler name reported to the rendering host
    pub template_handler: String,

    /// Deduplicate concurrent origin fetches in this process
    #[serde(skip_serializing_if = "is_false")]
    pub single_flight: bool,

    /// Restrict resolution to known context values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<GuardConfig>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            local_cache: LocalCacheConfig::default(),
            shared: SharedConfig::default(),
            origin: OriginConfig::default(),
            default_template: String::new(),
            template_handler: DEFAULT_HANDLER.to_string(),
            single_flight: false,
            guard: None,
        }
    }
}

/// Local tier lifetimes, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalCacheConfig {
    /// Lifetime of a template found in the shared tier or origin
    pub ttl: u64,

    /// Lifetime of the default template after a total miss
    pub negative_ttl: u64,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            ttl: 60,
            negative_ttl: 10,
        }
    }
}

/// Shared tier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedConfig {
    /// Namespace prepended to every shared key
    pub key_prefix: String,

    /// Directory for the file-backed shared tier; in-memory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_SHARED_KEY_PREFIX.to_string(),
            directory: None,
        }
    }
}

/// Origin settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// URL pattern, e.g. `https://layouts.example.com/{app}/{name}.html`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Treat non-2xx responses other than 404 as misses
    #[serde(skip_serializing_if = "is_false")]
    pub reject_error_status: bool,

    /// Markers every fetched body must contain
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_markers: Vec<String>,

    /// Largest accepted body in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<usize>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url_template: None,
            timeout: 5,
            reject_error_status: false,
            required_markers: Vec::new(),
            max_body_bytes: None,
        }
    }
}

/// Context allow-list consulted before any tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Context field to check (e.g. `app`)
    pub field: String,

    /// Accepted values
    pub allowed: Vec<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: ResolverConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.local_cache.ttl, 60);
        assert_eq!(config.local_cache.negative_ttl, 10);
        assert_eq!(config.origin.timeout, 5);
        assert_eq!(config.shared.key_prefix, "rlt:");
        assert_eq!(config.name_prefix, "redis:");
        assert_eq!(config.template_handler, "erb");
        assert_eq!(config.default_template, "");
    }

    #[test]
    fn parses_full_config() {
        let yaml = r#"
name_prefix: "remote:"
default_template: "<html>{{{body}}}</html>"
single_flight: true
local_cache:
  ttl: 120
  negative_ttl: 5
shared:
  key_prefix: "tpl:"
  directory: /var/cache/templates
origin:
  url_template: "https://layouts.example.com/{app}/{name}.html"
  timeout: 2
  reject_error_status: true
  required_markers: ["{{{body}}}"]
  max_body_bytes: 65536
guard:
  field: app
  allowed: [shop, blog]
"#;
        let config: ResolverConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.name_prefix, "remote:");
        assert!(config.single_flight);
        assert_eq!(config.local_cache.ttl, 120);
        assert_eq!(config.local_cache.negative_ttl, 5);
        assert_eq!(config.shared.key_prefix, "tpl:");
        assert_eq!(
            config.shared.directory,
            Some(PathBuf::from("/var/cache/templates"))
        );
        assert_eq!(config.origin.timeout, 2);
        assert!(config.origin.reject_error_status);
        assert_eq!(config.origin.required_markers, vec!["{{{body}}}"]);
        assert_eq!(config.origin.max_body_bytes, Some(65536));
        let guard = config.guard.unwrap();
        assert_eq!(guard.field, "app");
        assert_eq!(guard.allowed, vec!["shop", "blog"]);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: ResolverConfig = serde_yaml::from_str("local_cache:\n  ttl: 30\n").unwrap();

        assert_eq!(config.local_cache.ttl, 30);
        assert_eq!(config.local_cache.negative_ttl, 10);
    }

    #[test]
    fn serialization_skips_unset_options() {
        let yaml = serde_yaml::to_string(&ResolverConfig::default()).unwrap();

        assert!(!yaml.contains("guard"));
        assert!(!yaml.contains("url_template"));
        assert!(!yaml.contains("single_flight"));
        assert!(yaml.contains("negative_ttl: 10"));
    }
}
