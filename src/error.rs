//! error types surfaced to the channel-management layer

use thiserror::Error;

/// Channel settings failed validation at construction time. Fatal for the
/// channel until its settings are corrected; never raised while building a
/// message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ValidationError {
    /// human readable description of the missing or invalid setting
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A templated field failed to parse or evaluate. The engine's error text is
/// preserved verbatim so callers can match on it.
///
/// Aborts the current delivery's message build; the channel stays usable for
/// subsequent deliveries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to template PagerDuty message: {0}")]
pub struct TemplateError(pub(crate) String);

impl TemplateError {
    /// the unmodified error text reported by the template engine
    pub fn engine_message(&self) -> &str {
        &self.0
    }
}

/// Union of the two failure modes of this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}
