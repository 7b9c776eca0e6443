//! validation of raw channel settings
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::ValidationError;

/// severity reported to the vendor when none is configured
pub const DEFAULT_SEVERITY: &str = "critical";
/// the vendor caps summaries at this many bytes
pub const DEFAULT_SUMMARY_MAX_LEN: usize = 1024;

/// Validated PagerDuty channel settings.
///
/// Constructed once by [`validate`](Self::validate) and immutable afterwards;
/// changing a channel's configuration means running a fresh validation pass.
/// Every field except the integration key may hold a template string, those
/// are compiled at message-build time so a syntax error surfaces as a
/// [`TemplateError`](crate::error::TemplateError) per delivery, never here.
#[derive(Debug, Clone)]
pub struct PagerDutySettings {
    /// routing key of the vendor-side integration, the one mandatory field
    pub integration_key: String,
    pub severity: String,
    pub class: String,
    /// falls back to the client name when not configured
    pub component: Option<String>,
    pub group: String,
    /// template for the payload summary, `None` means the built-in one
    pub summary: Option<String>,
    /// template for the message description, `None` means the built-in one
    pub description: Option<String>,
    /// rendered summaries longer than this many bytes are truncated
    pub summary_max_len: usize,
    /// optional description cap, off unless the vendor mandates one
    pub description_max_len: Option<usize>,
    /// overrides the process-wide client url for this channel
    pub client_url: Option<Url>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    integration_key: String,
    severity: Option<String>,
    class: Option<String>,
    component: Option<String>,
    group: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    summary_max_len: Option<usize>,
    description_max_len: Option<usize>,
    client_url: Option<Url>,
}

impl PagerDutySettings {
    /// Validates raw settings as stored by the channel-management layer.
    ///
    /// The integration key is the only mandatory field; a missing or empty
    /// key is the single initialization failure this channel type knows.
    pub fn validate(settings: &Value) -> Result<Self, ValidationError> {
        let raw: RawSettings = serde_json::from_value(settings.clone())
            .map_err(|err| ValidationError::new(format!("invalid settings: {err}")))?;

        if raw.integration_key.is_empty() {
            return Err(ValidationError::new(
                "Could not find integration key property in settings",
            ));
        }

        Ok(Self {
            integration_key: raw.integration_key,
            severity: raw.severity.unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
            class: raw.class.unwrap_or_else(|| "todo_class".to_string()),
            component: raw.component,
            group: raw.group.unwrap_or_else(|| "todo_group".to_string()),
            summary: raw.summary,
            description: raw.description,
            summary_max_len: raw.summary_max_len.unwrap_or(DEFAULT_SUMMARY_MAX_LEN),
            description_max_len: raw.description_max_len,
            client_url: raw.client_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_settings_fail_with_exact_reason() {
        let err = PagerDutySettings::validate(&json!({})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find integration key property in settings"
        );

        // an empty key is as useless as a missing one
        let err = PagerDutySettings::validate(&json!({ "integrationKey": "" })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find integration key property in settings"
        );
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let settings =
            PagerDutySettings::validate(&json!({ "integrationKey": "abcdefgh0123456789" }))
                .unwrap();

        assert_eq!(settings.integration_key, "abcdefgh0123456789");
        assert_eq!(settings.severity, "critical");
        assert_eq!(settings.class, "todo_class");
        assert_eq!(settings.group, "todo_group");
        assert_eq!(settings.component, None);
        assert_eq!(settings.summary, None);
        assert_eq!(settings.description, None);
        assert_eq!(settings.summary_max_len, DEFAULT_SUMMARY_MAX_LEN);
        assert_eq!(settings.description_max_len, None);
        assert_eq!(settings.client_url, None);
    }

    #[test]
    fn configured_fields_override_defaults() {
        let settings = PagerDutySettings::validate(&json!({
            "integrationKey": "abcdefgh0123456789",
            "severity": "warning",
            "class": "{{ status }}",
            "component": "My Monitoring",
            "group": "my_group",
            "summaryMaxLen": 64,
            "clientUrl": "https://monitoring.example.com"
        }))
        .unwrap();

        assert_eq!(settings.severity, "warning");
        assert_eq!(settings.class, "{{ status }}");
        assert_eq!(settings.component.as_deref(), Some("My Monitoring"));
        assert_eq!(settings.group, "my_group");
        assert_eq!(settings.summary_max_len, 64);
        assert_eq!(
            settings.client_url.unwrap().as_str(),
            "https://monitoring.example.com/"
        );
    }

    #[test]
    fn malformed_templates_pass_validation() {
        // template syntax is only checked when a message is built
        let settings = PagerDutySettings::validate(&json!({
            "integrationKey": "abcdefgh0123456789",
            "class": "{{ .Status }"
        }))
        .unwrap();

        assert_eq!(settings.class, "{{ .Status }");
    }
}
