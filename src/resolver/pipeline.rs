//! Tiered template resolution.
//!
//! Lookup order (first hit wins):
//! 1. Local tier
//! 2. Shared tier, written back to the local tier
//! 3. Origin, written back to the local and shared tiers
//! 4. Default template, cached locally for the negative TTL
//!
//! No error escapes [`Resolver::resolve`]: every tier failure is logged and
//! treated as a miss, so the worst case is the default template.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::hooks::{
    AllowAll, ContextAllowList, NoOrigin, ResolutionGuard, UrlMapper, UrlTemplate,
};
use super::request::{ResolutionKey, ResolutionRequest, DEFAULT_NAME_PREFIX};
use super::single_flight::SingleFlight;
use super::stats::{ResolverStats, StatsSnapshot};
use crate::cache::{
    DirectorySharedTier, LocalTier, MemorySharedTier, SharedTier, DEFAULT_SHARED_KEY_PREFIX,
};
use crate::config::{validate, ResolverConfig};
use crate::error::Result;
use crate::origin::{MaxLength, OriginFetcher, PostProcessChain, RequireMarkers};

/// Default lifetime of a successful resolution in the local tier.
pub const DEFAULT_LOCAL_TTL: Duration = Duration::from_secs(60);

/// Default lifetime of the default template in the local tier.
pub const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(10);

/// Default template handler name.
pub const DEFAULT_HANDLER: &str = "erb";

/// Tier that produced a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierSource {
    Local,
    Shared,
    Origin,
    Default,
}

impl fmt::Display for TierSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Shared => "shared",
            Self::Origin => "origin",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}

/// A template ready to hand to the rendering host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTemplate {
    /// Resolution key the template was found under.
    pub key: String,
    /// Template body.
    pub body: String,
    /// Tier that served the body.
    pub source: TierSource,
    /// `prefix/name` path for the host's template registry.
    pub virtual_path: String,
    /// Handler the host should compile the body with.
    pub handler: String,
    /// Output format.
    pub format: String,
    /// When the resolution completed.
    pub resolved_at: DateTime<Utc>,
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A template, possibly the default one.
    Resolved(ResolvedTemplate),
    /// The request is not one this resolver answers.
    NotApplicable,
}

impl Resolution {
    /// The resolved template, if any.
    pub fn template(&self) -> Option<&ResolvedTemplate> {
        match self {
            Self::Resolved(template) => Some(template),
            Self::NotApplicable => None,
        }
    }

    /// Consume into the resolved template, if any.
    pub fn into_template(self) -> Option<ResolvedTemplate> {
        match self {
            Self::Resolved(template) => Some(template),
            Self::NotApplicable => None,
        }
    }

    /// The template body, if any.
    pub fn body(&self) -> Option<&str> {
        self.template().map(|t| t.body.as_str())
    }

    /// Check if the request was refused.
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }
}

/// Tunables for a [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Local lifetime of a template found in the shared tier or origin.
    pub local_ttl: Duration,
    /// Local lifetime of the default template after a total miss.
    pub negative_ttl: Duration,
    /// Origin request timeout.
    pub http_timeout: Duration,
    /// Body served when every tier misses.
    pub default_template: String,
    /// Prefix a requested name must carry.
    pub name_prefix: String,
    /// Namespace for shared tier keys.
    pub shared_key_prefix: String,
    /// Handler name reported on resolved templates.
    pub handler: String,
    /// Deduplicate concurrent origin fetches for the same key.
    pub single_flight: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            local_ttl: DEFAULT_LOCAL_TTL,
            negative_ttl: DEFAULT_NEGATIVE_TTL,
            http_timeout: crate::origin::DEFAULT_HTTP_TIMEOUT,
            default_template: String::new(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            shared_key_prefix: DEFAULT_SHARED_KEY_PREFIX.to_string(),
            handler: DEFAULT_HANDLER.to_string(),
            single_flight: false,
        }
    }
}

impl From<&ResolverConfig> for ResolverOptions {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            local_ttl: Duration::from_secs(config.local_cache.ttl),
            negative_ttl: Duration::from_secs(config.local_cache.negative_ttl),
            http_timeout: Duration::from_secs(config.origin.timeout),
            default_template: config.default_template.clone(),
            name_prefix: config.name_prefix.clone(),
            shared_key_prefix: config.shared.key_prefix.clone(),
            handler: config.template_handler.clone(),
            single_flight: config.single_flight,
        }
    }
}

/// Builds a [`Resolver`].
pub struct ResolverBuilder {
    options: ResolverOptions,
    local: Option<Arc<LocalTier>>,
    shared: Arc<dyn SharedTier>,
    origin: Option<OriginFetcher>,
    url_mapper: Arc<dyn UrlMapper>,
    guard: Arc<dyn ResolutionGuard>,
}

impl ResolverBuilder {
    fn new(shared: Arc<dyn SharedTier>) -> Self {
        Self {
            options: ResolverOptions::default(),
            local: None,
            shared,
            origin: None,
            url_mapper: Arc::new(NoOrigin),
            guard: Arc::new(AllowAll),
        }
    }

    /// Replace all tunables.
    pub fn options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Use an existing local tier, e.g. one shared with other resolvers.
    pub fn local_tier(mut self, local: Arc<LocalTier>) -> Self {
        self.local = Some(local);
        self
    }

    /// Replace the shared tier.
    pub fn shared_tier(mut self, shared: Arc<dyn SharedTier>) -> Self {
        self.shared = shared;
        self
    }

    /// Use a pre-configured origin fetcher.
    ///
    /// The fetcher's timeout replaces `http_timeout` from the options.
    pub fn origin(mut self, origin: OriginFetcher) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Set how keys map to origin URLs.
    pub fn url_mapper(mut self, mapper: impl UrlMapper + 'static) -> Self {
        self.url_mapper = Arc::new(mapper);
        self
    }

    /// Set the guard consulted before any tier.
    pub fn guard(mut self, guard: impl ResolutionGuard + 'static) -> Self {
        self.guard = Arc::new(guard);
        self
    }

    /// Finish building.
    pub fn build(self) -> Result<Resolver> {
        let mut options = self.options;
        let origin = match self.origin {
            Some(origin) => origin,
            None => OriginFetcher::with_timeout(options.http_timeout)?,
        };
        // An installed fetcher keeps its own timeout.
        options.http_timeout = origin.timeout();

        let flights = options.single_flight.then(SingleFlight::new);

        Ok(Resolver {
            local: self.local.unwrap_or_default(),
            shared: self.shared,
            origin,
            url_mapper: self.url_mapper,
            guard: self.guard,
            flights,
            stats: ResolverStats::default(),
            options,
        })
    }
}

/// Resolves templates through the local tier, shared tier and origin.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use template_resolver::cache::{MemorySharedTier, SharedTier};
/// use template_resolver::resolver::{ResolutionRequest, Resolver, TierSource};
///
/// let shared = Arc::new(MemorySharedTier::new());
/// shared.set("rlt:shop", "<main>{{{body}}}</main>").unwrap();
///
/// let resolver = Resolver::builder(shared).build().unwrap();
/// let resolution = resolver.resolve(&ResolutionRequest::new("redis:shop"));
///
/// let template = resolution.template().unwrap();
/// assert_eq!(template.body, "<main>{{{body}}}</main>");
/// assert_eq!(template.source, TierSource::Shared);
/// ```
pub struct Resolver {
    options: ResolverOptions,
    local: Arc<LocalTier>,
    shared: Arc<dyn SharedTier>,
    origin: OriginFetcher,
    url_mapper: Arc<dyn UrlMapper>,
    guard: Arc<dyn ResolutionGuard>,
    flights: Option<SingleFlight>,
    stats: ResolverStats,
}

impl Resolver {
    /// Start building a resolver over a shared tier.
    pub fn builder(shared: Arc<dyn SharedTier>) -> ResolverBuilder {
        ResolverBuilder::new(shared)
    }

    /// Start building a resolver from configuration.
    ///
    /// The shared tier is a directory store when `shared.directory` is set,
    /// otherwise an in-memory store; hosts with a distributed store replace
    /// it with [`ResolverBuilder::shared_tier`].
    pub fn builder_from_config(config: &ResolverConfig) -> Result<ResolverBuilder> {
        validate(config)?;

        let shared: Arc<dyn SharedTier> = match &config.shared.directory {
            Some(dir) => Arc::new(DirectorySharedTier::new(dir)),
            None => Arc::new(MemorySharedTier::new()),
        };

        let mut checks = PostProcessChain::new();
        if !config.origin.required_markers.is_empty() {
            checks = checks.then(RequireMarkers::new(config.origin.required_markers.clone()));
        }
        if let Some(limit) = config.origin.max_body_bytes {
            checks = checks.then(MaxLength(limit));
        }

        let mut origin = OriginFetcher::with_timeout(Duration::from_secs(config.origin.timeout))?
            .reject_error_status(config.origin.reject_error_status);
        if !checks.is_empty() {
            origin = origin.with_post_processor(checks);
        }

        let mut builder = ResolverBuilder::new(shared)
            .options(ResolverOptions::from(config))
            .origin(origin);

        if let Some(pattern) = &config.origin.url_template {
            builder = builder.url_mapper(UrlTemplate::parse(pattern.as_str())?);
        }

        if let Some(guard) = &config.guard {
            builder = builder.guard(ContextAllowList::new(
                guard.field.clone(),
                guard.allowed.clone(),
            ));
        }

        Ok(builder)
    }

    /// Build a resolver straight from configuration.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        Self::builder_from_config(config)?.build()
    }

    /// The resolver's tunables.
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// The local tier used by this resolver.
    pub fn local_tier(&self) -> &Arc<LocalTier> {
        &self.local
    }

    /// Drop every local entry.
    pub fn clear_local_cache(&self) {
        self.local.clear();
    }

    /// Current resolution counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Resolve a request to a template.
    ///
    /// Returns [`Resolution::NotApplicable`] without touching any tier when
    /// the name lacks the configured prefix or the guard refuses the
    /// request; otherwise always returns a template.
    pub fn resolve(&self, request: &ResolutionRequest) -> Resolution {
        debug!("Resolving template '{}'", request.name());

        let Some(key) = ResolutionKey::from_name(request.name(), &self.options.name_prefix) else {
            debug!("'{}' is not a resolver template name", request.name());
            self.stats.record_not_applicable();
            return Resolution::NotApplicable;
        };

        if !self.guard.allows(request) {
            debug!("Guard refused '{}'", request.name());
            self.stats.record_not_applicable();
            return Resolution::NotApplicable;
        }

        let (body, source) = self.fetch_template(&key, request);
        self.stats.record(source);
        debug!("Resolved '{}' from {} tier", key, source);

        Resolution::Resolved(ResolvedTemplate {
            key: key.as_str().to_string(),
            body,
            source,
            virtual_path: request.virtual_path(),
            handler: self.options.handler.clone(),
            format: "html".to_string(),
            resolved_at: Utc::now(),
        })
    }

    fn fetch_template(
        &self,
        key: &ResolutionKey,
        request: &ResolutionRequest,
    ) -> (String, TierSource) {
        if let Some(body) = self.local.get(key.as_str()) {
            return (body, TierSource::Local);
        }

        if let Some(body) = self.fetch_from_shared(key) {
            return (body, TierSource::Shared);
        }

        if let Some(body) = self.fetch_from_origin(key, request) {
            return (body, TierSource::Origin);
        }

        debug!(
            "All tiers missed for '{}', serving default for {}s",
            key,
            self.options.negative_ttl.as_secs()
        );
        let body = self.local.put(
            key.as_str(),
            self.options.default_template.as_str(),
            self.options.negative_ttl,
        );
        (body, TierSource::Default)
    }

    fn fetch_from_shared(&self, key: &ResolutionKey) -> Option<String> {
        let shared_key = key.shared_key(&self.options.shared_key_prefix);

        match self.shared.get(&shared_key) {
            Ok(Some(body)) => Some(self.local.put(key.as_str(), body, self.options.local_ttl)),
            Ok(None) => None,
            Err(e) => {
                warn!("Shared tier read failed, treating as miss: {}", e);
                self.stats.record_shared_error();
                None
            }
        }
    }

    fn fetch_from_origin(
        &self,
        key: &ResolutionKey,
        request: &ResolutionRequest,
    ) -> Option<String> {
        match &self.flights {
            Some(flights) => {
                flights.run(key.as_str(), || self.fetch_remote_and_store(key, request))
            }
            None => self.fetch_remote_and_store(key, request),
        }
    }

    fn fetch_remote_and_store(
        &self,
        key: &ResolutionKey,
        request: &ResolutionRequest,
    ) -> Option<String> {
        let url = self.url_mapper.url_for(key.as_str(), request);
        let body = self.origin.fetch(key.as_str(), url.as_deref())?;

        let body = self.local.put(key.as_str(), body, self.options.local_ttl);
        self.store_to_shared(key, &body);
        Some(body)
    }

    fn store_to_shared(&self, key: &ResolutionKey, body: &str) {
        let shared_key = key.shared_key(&self.options.shared_key_prefix);
        if let Err(e) = self.shared.set(&shared_key, body) {
            warn!("Shared tier write failed, keeping origin result: {}", e);
            self.stats.record_shared_error();
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("options", &self.options)
            .field("local_entries", &self.local.len())
            .field("origin", &self.origin)
            .field("single_flight", &self.flights.is_some())
            .finish()
    }
}
