//! Host-supplied hooks: origin URL mapping and request guards.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::request::ResolutionRequest;
use crate::error::{ResolverError, Result};

/// Maps a resolution key to its origin URL.
///
/// Returning `None` skips the origin step without a network call.
pub trait UrlMapper: Send + Sync {
    /// Origin URL for `key` in the context of `request`.
    fn url_for(&self, key: &str, request: &ResolutionRequest) -> Option<String>;
}

impl<F> UrlMapper for F
where
    F: Fn(&str, &ResolutionRequest) -> Option<String> + Send + Sync,
{
    fn url_for(&self, key: &str, request: &ResolutionRequest) -> Option<String> {
        self(key, request)
    }
}

/// Mapper with no origin; every lookup falls through to the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOrigin;

impl UrlMapper for NoOrigin {
    fn url_for(&self, _key: &str, _request: &ResolutionRequest) -> Option<String> {
        None
    }
}

/// Decides whether the resolver handles a request at all.
///
/// A refused request yields `Resolution::NotApplicable` and touches no tier.
pub trait ResolutionGuard: Send + Sync {
    /// Whether `request` should be resolved.
    fn allows(&self, request: &ResolutionRequest) -> bool;
}

impl<F> ResolutionGuard for F
where
    F: Fn(&ResolutionRequest) -> bool + Send + Sync,
{
    fn allows(&self, request: &ResolutionRequest) -> bool {
        self(request)
    }
}

/// Guard that accepts every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl ResolutionGuard for AllowAll {
    fn allows(&self, _request: &ResolutionRequest) -> bool {
        true
    }
}

/// Guard accepting requests whose context value is in a fixed set.
///
/// # Example
///
/// ```
/// use template_resolver::resolver::{ContextAllowList, ResolutionGuard, ResolutionRequest};
///
/// let guard = ContextAllowList::new("app", ["shop", "blog"]);
/// assert!(guard.allows(&ResolutionRequest::new("redis:x").with_context("app", "shop")));
/// assert!(!guard.allows(&ResolutionRequest::new("redis:x").with_context("app", "wiki")));
/// ```
#[derive(Debug, Clone)]
pub struct ContextAllowList {
    field: String,
    allowed: HashSet<String>,
}

impl ContextAllowList {
    /// Allow requests whose `field` context value is one of `allowed`.
    pub fn new<I, S>(field: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// The context field being checked.
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl ResolutionGuard for ContextAllowList {
    fn allows(&self, request: &ResolutionRequest) -> bool {
        request
            .context_value(&self.field)
            .is_some_and(|value| self.allowed.contains(value))
    }
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Placeholder filled with the resolution key.
pub const NAME_PLACEHOLDER: &str = "name";

/// URL pattern with `{placeholder}` segments.
///
/// `{name}` is replaced by the resolution key, any other placeholder by the
/// request context value of the same name. Values are percent-encoded. If a
/// placeholder has no value the mapper yields `None`.
///
/// # Example
///
/// ```
/// use template_resolver::resolver::{ResolutionRequest, UrlMapper, UrlTemplate};
///
/// let mapper = UrlTemplate::parse("https://layouts.example.com/{app}/{name}.html").unwrap();
/// let request = ResolutionRequest::new("redis:main").with_context("app", "shop");
///
/// assert_eq!(
///     mapper.url_for("main", &request).as_deref(),
///     Some("https://layouts.example.com/shop/main.html")
/// );
/// assert_eq!(mapper.url_for("main", &ResolutionRequest::new("redis:main")), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    pattern: String,
    placeholders: Vec<String>,
}

impl UrlTemplate {
    /// Parse and validate a pattern.
    pub fn parse(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();

        let leftover = PLACEHOLDER.replace_all(&pattern, "");
        if leftover.contains('{') || leftover.contains('}') {
            return Err(ResolverError::ConfigValidationError {
                message: format!("Malformed placeholder in URL template '{}'", pattern),
            });
        }

        let placeholders = PLACEHOLDER
            .captures_iter(&pattern)
            .map(|caps| caps[1].to_string())
            .collect();

        Ok(Self {
            pattern,
            placeholders,
        })
    }

    /// The raw pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Fill the pattern for `key` and `request`.
    pub fn render(&self, key: &str, request: &ResolutionRequest) -> Option<String> {
        let lookup = |name: &str| {
            if name == NAME_PLACEHOLDER {
                Some(key)
            } else {
                request.context_value(name)
            }
        };

        if self.placeholders.iter().any(|p| lookup(p).is_none()) {
            return None;
        }

        let url = PLACEHOLDER.replace_all(&self.pattern, |caps: &regex::Captures<'_>| {
            lookup(&caps[1])
                .map(|value| urlencoding::encode(value).into_owned())
                .unwrap_or_default()
        });
        Some(url.into_owned())
    }
}

impl UrlMapper for UrlTemplate {
    fn url_for(&self, key: &str, request: &ResolutionRequest) -> Option<String> {
        self.render(key, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(app: &str) -> ResolutionRequest {
        ResolutionRequest::new("redis:main").with_context("app", app)
    }

    #[test]
    fn closure_url_mapper() {
        let mapper =
            |key: &str, _: &ResolutionRequest| Some(format!("http://origin.test/{}", key));

        assert_eq!(
            mapper.url_for("main", &request("shop")).as_deref(),
            Some("http://origin.test/main")
        );
    }

    #[test]
    fn no_origin_never_maps() {
        assert_eq!(NoOrigin.url_for("main", &request("shop")), None);
    }

    #[test]
    fn closure_guard() {
        let guard = |r: &ResolutionRequest| r.prefix() == Some("layouts");

        assert!(guard.allows(&request("shop").with_prefix("layouts")));
        assert!(!guard.allows(&request("shop").with_prefix("not_a_layout")));
    }

    #[test]
    fn allow_all_accepts_everything() {
        assert!(AllowAll.allows(&ResolutionRequest::new("anything")));
    }

    #[test]
    fn allow_list_rejects_missing_field() {
        let guard = ContextAllowList::new("app", ["shop"]);

        assert_eq!(guard.field(), "app");
        assert!(!guard.allows(&ResolutionRequest::new("redis:main")));
    }

    #[test]
    fn url_template_lists_placeholders() {
        let mapper = UrlTemplate::parse("http://origin.test/{app}/{name}").unwrap();

        assert_eq!(mapper.placeholders(), ["app", "name"]);
        assert_eq!(mapper.pattern(), "http://origin.test/{app}/{name}");
    }

    #[test]
    fn url_template_without_placeholders() {
        let mapper = UrlTemplate::parse("http://www.example.com/some/path").unwrap();

        assert_eq!(
            mapper.url_for("main", &request("shop")).as_deref(),
            Some("http://www.example.com/some/path")
        );
    }

    #[test]
    fn url_template_unknown_context_yields_none() {
        let mapper = UrlTemplate::parse("http://origin.test/{tenant}/{name}").unwrap();

        assert_eq!(mapper.url_for("main", &request("shop")), None);
    }

    #[test]
    fn url_template_encodes_values() {
        let mapper = UrlTemplate::parse("http://origin.test/{app}/{name}").unwrap();

        assert_eq!(
            mapper.url_for("a b/c", &request("shop&co")).as_deref(),
            Some("http://origin.test/shop%26co/a%20b%2Fc")
        );
    }

    #[test]
    fn url_template_rejects_malformed_placeholder() {
        assert!(UrlTemplate::parse("http://origin.test/{name").is_err());
        assert!(UrlTemplate::parse("http://origin.test/{1bad}").is_err());
        assert!(UrlTemplate::parse("http://origin.test/name}").is_err());
    }
}
