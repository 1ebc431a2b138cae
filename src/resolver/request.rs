//! Resolution requests and keys.

use std::collections::BTreeMap;
use std::fmt;

/// Default prefix a template name must carry to be handled by the resolver.
pub const DEFAULT_NAME_PREFIX: &str = "redis:";

/// One host call asking for a template.
///
/// # Example
///
/// ```
/// use template_resolver::resolver::ResolutionRequest;
///
/// let request = ResolutionRequest::new("redis:kabeleins_local")
///     .with_prefix("layouts")
///     .with_context("app", "kabeleins");
///
/// assert_eq!(request.context_value("app"), Some("kabeleins"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionRequest {
    name: String,
    prefix: Option<String>,
    partial: bool,
    context: BTreeMap<String, String>,
}

impl ResolutionRequest {
    /// Create a request for a template name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the lookup prefix (e.g. `layouts`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Mark the request as a partial lookup.
    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// Add a context value for URL mapping and guards.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// The requested template name, prefix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lookup prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Whether this is a partial lookup.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// All context values.
    pub fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    /// Look up a single context value.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    /// Virtual path of the template, `prefix/name` when a prefix is set.
    pub fn virtual_path(&self) -> String {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}/{}", prefix, self.name),
            _ => self.name.clone(),
        }
    }
}

/// Identifier of a template across every tier.
///
/// Derived once per request from the requested name by removing the name
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey(String);

impl ResolutionKey {
    /// Derive the key from a requested name.
    ///
    /// Returns `None` when the name lacks `name_prefix` or nothing follows
    /// the prefix. A bare prefix is refused instead of being resolved as an
    /// empty name, so it never reaches the shared tier or the origin.
    pub fn from_name(name: &str, name_prefix: &str) -> Option<Self> {
        let identifier = name.strip_prefix(name_prefix)?;
        if identifier.is_empty() {
            return None;
        }
        Some(Self(identifier.to_string()))
    }

    /// Wrap an identifier that is already stripped.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used in the shared tier, namespaced with `prefix`.
    pub fn shared_key(&self, prefix: &str) -> String {
        crate::cache::shared_key(prefix, &self.0)
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResolutionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
