//! Error types for template resolution.
//!
//! This module defines [`ResolverError`], the error type used by the tiers,
//! the origin fetcher and configuration loading, and a [`Result`] alias.
//!
//! # Error Handling Strategy
//!
//! - Tier and origin failures are reported as `ResolverError` internally,
//!   then absorbed by the pipeline and turned into a fall-through
//! - Configuration errors surface to the caller, since a resolver cannot be
//!   built without a valid configuration
//! - Use `anyhow::Error` (via `ResolverError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for resolver operations.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// A post-processor refused the body fetched from the origin.
    #[error("Template '{name}' rejected: {reason}")]
    TemplateRejected { name: String, reason: String },

    /// Transport-level failure talking to the origin.
    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// The shared tier could not complete a read or write.
    #[error("Shared tier operation on '{key}' failed: {message}")]
    SharedTier { key: String, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResolverError {
    /// Build a rejection error for a template.
    pub fn rejected(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TemplateRejected {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a post-processing rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::TemplateRejected { .. })
    }
}

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;
