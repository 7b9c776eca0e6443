//! the PagerDuty Events v2 notification channel
//!
//! Builds one [`PagerDutyMessage`] per alert-group delivery: templated
//! fields are rendered against the group's [`RenderContext`], the firing and
//! resolved subsets are dumped into the custom-detail map and the dedup key
//! is derived from the group key. Delivering the message to the vendor is
//! the transport collaborator's job.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use url::Url;

use crate::{
    alert::{Alert, AlertGroup},
    channel::{ClientInfo, NotificationChannel},
    context::RenderContext,
    error::{Error, TemplateError, ValidationError},
    settings::PagerDutySettings,
    template::{CompiledTemplate, TemplateEngine, TeraEngine, DEFAULT_SUMMARY, DEFAULT_TITLE},
};

/// incident lifecycle transition signaled to the vendor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Trigger,
    Resolve,
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventAction::Trigger => f.write_str("trigger"),
            EventAction::Resolve => f.write_str("resolve"),
        }
    }
}

/// the outbound message, field names match the Events v2 wire format
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PagerDutyMessage {
    pub routing_key: String,
    pub dedup_key: String,
    pub description: String,
    pub event_action: EventAction,
    pub payload: PagerDutyPayload,
    pub client: String,
    pub client_url: Url,
    pub links: Vec<PagerDutyLink>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PagerDutyPayload {
    pub summary: String,
    pub source: String,
    pub severity: String,
    pub class: String,
    pub component: String,
    pub group: String,
    /// exactly the keys `firing`, `resolved`, `num_firing`, `num_resolved`
    pub custom_details: IndexMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PagerDutyLink {
    pub href: Url,
    pub text: String,
}

/// A validated PagerDuty channel.
///
/// Immutable after construction; building is a pure synchronous computation
/// and may run concurrently from any number of callers.
#[derive(Debug)]
pub struct PagerDutyChannel {
    settings: PagerDutySettings,
    client: ClientInfo,
    engine: TeraEngine,
}

impl PagerDutyChannel {
    /// Validates raw settings into a channel.
    ///
    /// Fails only when the integration key is missing; templated fields are
    /// deliberately not compiled here, their syntax errors belong to the
    /// delivery that renders them.
    pub fn new(settings: &Value, client: ClientInfo) -> Result<Self, ValidationError> {
        let settings = PagerDutySettings::validate(settings)?;
        tracing::debug!(channel = "pagerduty", "validated channel settings");

        Ok(Self {
            settings,
            client,
            engine: TeraEngine,
        })
    }

    /// Builds the outbound message for one delivery.
    ///
    /// Every templated field renders against the same context snapshot; the
    /// first render failure aborts the build, a partial message is never
    /// returned.
    pub fn build_message(&self, group: &AlertGroup) -> Result<PagerDutyMessage, TemplateError> {
        let context = RenderContext::new(group);
        tracing::debug!(
            group_key = group.group_key.as_str(),
            status = %context.status(),
            num_firing = context.num_firing(),
            num_resolved = context.num_resolved(),
            "building pagerduty message"
        );

        let description = truncate(
            self.render_or(self.settings.description.as_deref(), &DEFAULT_TITLE, &context)?,
            self.settings.description_max_len.unwrap_or(usize::MAX),
        );
        let summary = truncate(
            self.render_or(self.settings.summary.as_deref(), &DEFAULT_SUMMARY, &context)?,
            self.settings.summary_max_len,
        );
        let severity = self.render(&self.settings.severity, &context)?;
        let class = self.render(&self.settings.class, &context)?;
        let group_field = self.render(&self.settings.group, &context)?;
        let component = match &self.settings.component {
            Some(component) => self.render(component, &context)?,
            None => self.client.name.clone(),
        };

        let mut custom_details = IndexMap::with_capacity(4);
        custom_details.insert("firing".to_string(), format_alert_list(group.firing()));
        custom_details.insert("num_firing".to_string(), context.num_firing().to_string());
        custom_details.insert(
            "num_resolved".to_string(),
            context.num_resolved().to_string(),
        );
        custom_details.insert("resolved".to_string(), format_alert_list(group.resolved()));

        let event_action = if context.num_firing() > 0 {
            EventAction::Trigger
        } else {
            EventAction::Resolve
        };
        tracing::debug!(event_action = %event_action, "assembled pagerduty message");

        // channel override first, then the group's own link, then the
        // process-wide base url
        let client_url = self
            .settings
            .client_url
            .clone()
            .or_else(|| group.external_url.clone())
            .unwrap_or_else(|| self.client.url.clone());

        Ok(PagerDutyMessage {
            routing_key: self.settings.integration_key.clone(),
            dedup_key: dedup_key(&group.group_key),
            description,
            event_action,
            payload: PagerDutyPayload {
                summary,
                source: self.client.source.clone(),
                severity,
                class,
                component,
                group: group_field,
                custom_details,
            },
            client: self.client.name.clone(),
            client_url: client_url.clone(),
            links: vec![PagerDutyLink {
                href: client_url,
                text: "External URL".to_string(),
            }],
        })
    }

    /// compile and evaluate one configured field
    fn render(&self, source: &str, context: &RenderContext) -> Result<String, TemplateError> {
        let compiled = self.engine.parse(source)?;
        self.engine.render(&compiled, context)
    }

    /// like [`render`](Self::render), falling back to an already compiled
    /// built-in template when the field is not configured
    fn render_or(
        &self,
        source: Option<&str>,
        default: &CompiledTemplate,
        context: &RenderContext,
    ) -> Result<String, TemplateError> {
        match source {
            Some(source) => self.render(source, context),
            None => self.engine.render(default, context),
        }
    }
}

impl NotificationChannel for PagerDutyChannel {
    fn kind(&self) -> &'static str {
        "pagerduty"
    }

    fn build(&self, group: &AlertGroup) -> Result<Value, Error> {
        let message = self.build_message(group)?;

        #[allow(clippy::expect_used)]
        let value = serde_json::to_value(message).expect("message serializes to JSON");
        Ok(value)
    }
}

/// Derives the stable deduplication identifier for a group key.
///
/// Pure function of the key alone, identical across restarts and hosts, so
/// the vendor recognizes repeated deliveries of the same group as one
/// incident.
pub fn dedup_key(group_key: &str) -> String {
    hex::encode(Sha256::digest(group_key.as_bytes()))
}

/// Renders the plain-text dump of one alert subset.
///
/// Per alert, in subset order: a `Labels:` header with one ` - name = value`
/// line per label sorted by name, the same for annotations, then a `Source:`
/// line with the generator url. An empty subset yields an empty string.
fn format_alert_list<'a>(alerts: impl Iterator<Item = &'a Alert>) -> String {
    let mut out = String::new();

    for alert in alerts {
        out.push_str("Labels:\n");
        let mut labels: Vec<_> = alert.labels.iter().collect();
        labels.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in labels {
            out.push_str(&format!(" - {name} = {value}\n"));
        }

        out.push_str("Annotations:\n");
        let mut annotations: Vec<_> = alert.annotations.iter().collect();
        annotations.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in annotations {
            out.push_str(&format!(" - {name} = {value}\n"));
        }

        out.push_str("Source: ");
        out.push_str(&alert.generator_url);
        out.push('\n');
    }

    out
}

/// Truncates `text` to at most `max` bytes, marking the cut with `...`.
/// Caps too small to fit the marker cut without one. Never splits a code
/// point.
fn truncate(text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }

    let marker = if max >= 3 { "..." } else { "" };

    let mut cut = max - marker.len();
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }

    let mut text = text;
    text.truncate(cut);
    text.push_str(marker);
    text
}
