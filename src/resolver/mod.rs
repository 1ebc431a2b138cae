//! Template resolution pipeline.
//!
//! - [`request`]: requests and the keys derived from them
//! - [`hooks`]: host-supplied URL mapping and guards
//! - [`pipeline`]: the tiered [`Resolver`]
//! - [`single_flight`]: opt-in deduplication of concurrent origin fetches
//! - [`stats`]: per-outcome counters

pub mod hooks;
pub mod pipeline;
pub mod request;
pub mod single_flight;
pub mod stats;

pub use hooks::{
    AllowAll, ContextAllowList, NoOrigin, ResolutionGuard, UrlMapper, UrlTemplate,
    NAME_PLACEHOLDER,
};
pub use pipeline::{
    Resolution, ResolvedTemplate, Resolver, ResolverBuilder, ResolverOptions, TierSource,
    DEFAULT_HANDLER, DEFAULT_LOCAL_TTL, DEFAULT_NEGATIVE_TTL,
};
pub use request::{ResolutionKey, ResolutionRequest, DEFAULT_NAME_PREFIX};
pub use single_flight::SingleFlight;
pub use stats::{ResolverStats, StatsSnapshot};
