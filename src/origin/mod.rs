//! Template fetching from the origin.
//!
//! This module provides the HTTP fetcher that is the source of truth for
//! templates, and the post-processing hooks applied to fetched bodies.

pub mod fetcher;
pub mod postprocess;

pub use fetcher::{FetchOutcome, OriginFetcher, DEFAULT_HTTP_TIMEOUT};
pub use postprocess::{MaxLength, PostProcessChain, PostProcessor, RequireMarkers};
