//! Post-processing of fetched template bodies.
//!
//! A post-processor sees every body the origin returns before it is cached.
//! It can rewrite the body or reject it with
//! [`ResolverError::TemplateRejected`]; a rejected body is treated like a
//! miss and never reaches either cache tier.

use std::sync::Arc;

use crate::error::{ResolverError, Result};

/// Transforms or rejects a body fetched from the origin.
pub trait PostProcessor: Send + Sync {
    /// Process the body fetched for `key`.
    fn process(&self, key: &str, body: String) -> Result<String>;
}

impl<F> PostProcessor for F
where
    F: Fn(&str, String) -> Result<String> + Send + Sync,
{
    fn process(&self, key: &str, body: String) -> Result<String> {
        self(key, body)
    }
}

/// Rejects bodies that lack any of a set of markers.
///
/// # Example
///
/// ```
/// use template_resolver::origin::{PostProcessor, RequireMarkers};
///
/// let check = RequireMarkers::new(["{{{body}}}"]);
/// assert!(check.process("shop", "<main>{{{body}}}</main>".into()).is_ok());
/// assert!(check.process("shop", "<main></main>".into()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequireMarkers {
    markers: Vec<String>,
}

impl RequireMarkers {
    /// Require every marker in `markers`.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// The required markers.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl PostProcessor for RequireMarkers {
    fn process(&self, key: &str, body: String) -> Result<String> {
        let missing: Vec<&str> = self
            .markers
            .iter()
            .filter(|m| !body.contains(m.as_str()))
            .map(String::as_str)
            .collect();

        if missing.is_empty() {
            Ok(body)
        } else {
            Err(ResolverError::rejected(
                key,
                format!("missing markers: {}", missing.join(", ")),
            ))
        }
    }
}

/// Rejects bodies larger than a byte limit.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl PostProcessor for MaxLength {
    fn process(&self, key: &str, body: String) -> Result<String> {
        if body.len() > self.0 {
            return Err(ResolverError::rejected(
                key,
                format!("body is {} bytes, limit is {}", body.len(), self.0),
            ));
        }
        Ok(body)
    }
}

/// Runs processors in order; the first rejection stops the chain.
#[derive(Clone, Default)]
pub struct PostProcessChain {
    steps: Vec<Arc<dyn PostProcessor>>,
}

impl PostProcessChain {
    /// Create an empty chain, which passes bodies through untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a processor.
    pub fn then(mut self, step: impl PostProcessor + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Number of processors in the chain.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the chain has no processors.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for PostProcessChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostProcessChain")
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl PostProcessor for PostProcessChain {
    fn process(&self, key: &str, body: String) -> Result<String> {
        self.steps
            .iter()
            .try_fold(body, |body, step| step.process(key, body))
    }
}
