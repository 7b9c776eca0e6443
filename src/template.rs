//! template engine seam used by the notification channels
//!
//! Channels render their configurable fields through the [`TemplateEngine`]
//! trait instead of calling tera directly, which keeps the message builders
//! independent of the template syntax and makes render failures trivial to
//! inject in tests.

use once_cell::sync::Lazy;
use tera::Tera;

use crate::{context::RenderContext, error::TemplateError};

/// built-in template for the message description,
/// e.g. `[firing:1]  (val1)`
pub const DEFAULT_TITLE_TEMPLATE: &str = "[{{ status }}:{{ num_firing }}] \
     {{ group_label_values }} \
     {% if has_extra_labels %}({{ common_label_values }}){% endif %}";

/// built-in template for the payload summary, same shape as the title with
/// the status uppercased, e.g. `[FIRING:1]  (val1)`
pub const DEFAULT_SUMMARY_TEMPLATE: &str = "[{{ status | upper }}:{{ num_firing }}] \
     {{ group_label_values }} \
     {% if has_extra_labels %}({{ common_label_values }}){% endif %}";

/// A template compiled by some [`TemplateEngine`], opaque to callers.
#[derive(Debug)]
pub struct CompiledTemplate {
    tera: Tera,
}

/// name the single field template is registered under inside its [`Tera`]
const FIELD: &str = "field";

/// Parses and evaluates templated fields.
///
/// Implementations must be safe for concurrent read-only use: `render`
/// takes `&self` and a compiled template is never mutated after `parse`
/// returns it.
pub trait TemplateEngine: Send + Sync {
    /// Compiles a template source string.
    fn parse(&self, source: &str) -> Result<CompiledTemplate, TemplateError>;

    /// Evaluates a compiled template against the delivery's context.
    fn render(
        &self,
        template: &CompiledTemplate,
        context: &RenderContext,
    ) -> Result<String, TemplateError>;
}

/// The tera-backed engine used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraEngine;

impl TemplateEngine for TeraEngine {
    fn parse(&self, source: &str) -> Result<CompiledTemplate, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_template(FIELD, source)
            .map_err(TemplateError::from_engine)?;

        Ok(CompiledTemplate { tera })
    }

    fn render(
        &self,
        template: &CompiledTemplate,
        context: &RenderContext,
    ) -> Result<String, TemplateError> {
        template
            .tera
            .render(FIELD, context.tera())
            .map_err(TemplateError::from_engine)
    }
}

impl TemplateError {
    /// Collects the full cause chain into one message. Tera's top-level
    /// Display omits the interesting part ("Failed to render 'field'"), the
    /// actual parse or evaluation problem sits in the sources.
    pub(crate) fn from_engine(err: tera::Error) -> Self {
        let mut message = err.to_string();

        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self(message)
    }
}

/// default title template, compiled once and shared by every channel
pub(crate) static DEFAULT_TITLE: Lazy<CompiledTemplate> = Lazy::new(|| {
    TeraEngine
        .parse(DEFAULT_TITLE_TEMPLATE)
        .expect("built-in title template compiles")
});

/// default summary template, compiled once and shared by every channel
pub(crate) static DEFAULT_SUMMARY: Lazy<CompiledTemplate> = Lazy::new(|| {
    TeraEngine
        .parse(DEFAULT_SUMMARY_TEMPLATE)
        .expect("built-in summary template compiles")
});
